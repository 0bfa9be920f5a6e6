//! Committed-tree queries, for hosts and tests.

use element::{Props, Updater};
use host_api::HostAdapter;

use crate::node::{NodeId, NodeKind};
use crate::scheduler::Engine;

impl<H: HostAdapter> Engine<H> {
    /// Depth-first search of the committed tree for the first host node
    /// with `tag`.
    pub fn find_host_by_tag(&self, tag: &str) -> Option<Updater> {
        self.find_in_current(|kind, _| matches!(kind, NodeKind::Host(name) if &**name == tag))
    }

    /// Depth-first search of the committed tree for the first host node
    /// whose tag and committed props satisfy `predicate`.
    pub fn find_host(&self, predicate: impl Fn(&str, &Props) -> bool) -> Option<Updater> {
        self.find_in_current(
            |kind, props| matches!(kind, NodeKind::Host(name) if predicate(name, props)),
        )
    }

    /// Depth-first search for the first component node whose type name
    /// matches.
    pub fn find_component_by_name(&self, name: &str) -> Option<Updater> {
        self.find_in_current(|kind, _| matches!(kind, NodeKind::Component(ty) if ty.name() == name))
    }

    /// The host instance committed at `target`, when it names a host node.
    pub fn host_instance_at(&self, target: Updater) -> Option<H::Instance> {
        let node = NodeId(target.0);
        if !self.arena.contains(node) {
            return None;
        }
        self.arena.node(node).host_instance.clone()
    }

    fn find_in_current(
        &self,
        predicate: impl Fn(&NodeKind, &Props) -> bool,
    ) -> Option<Updater> {
        let mut stack = vec![self.root.node];
        while let Some(node) = stack.pop() {
            let work_node = self.arena.node(node);
            if predicate(&work_node.kind, &work_node.memoized_props) {
                return Some(Updater(node.0));
            }
            // Push siblings first so the leftmost child is visited next.
            let mut children = Vec::new();
            let mut child = work_node.child;
            while let Some(id) = child {
                children.push(id);
                child = self.arena.node(id).sibling;
            }
            while let Some(id) = children.pop() {
                stack.push(id);
            }
        }
        None
    }
}

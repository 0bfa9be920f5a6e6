//! The commit pipeline: three ordered passes over the effect list,
//! executed synchronously, never yielding.
//!
//! Ordering:
//! 1. Snapshot pass — capture pre-mutation values from the tree about to
//!    be replaced.
//! 2. Mutation pass — placements, host property updates, deletions, in
//!    recorded order (deletions were threaded first per parent).
//! 3. Flip — `root.current` becomes the finished tree, strictly between
//!    mutation and lifecycle: teardown observed the old tree as current,
//!    mount/update hooks observe the new one.
//! 4. Lifecycle pass — mount/update notifications; state changes raised
//!    here defer to the next turn of the work loop.
//!
//! A panic from a host mutation or a lifecycle hook propagates; the flip
//! may already have happened by then. That inconsistency window is a
//! documented property of the protocol, not something the engine hides.

use element::{LifecycleCtx, Updater};
use host_api::HostAdapter;

use crate::clock::ExpirationTime;
use crate::node::{EffectTag, NodeId, NodeKind};
use crate::scheduler::Engine;

/// Where a placed or removed host node attaches.
enum HostParent<H: HostAdapter> {
    Container,
    Instance(H::Instance),
}

impl<H: HostAdapter> Engine<H> {
    pub(crate) fn complete_root(&mut self, finished: NodeId) {
        self.root.finished_work = None;
        self.sched.work_scheduled = false;
        self.commit_root(finished);
    }

    fn commit_root(&mut self, finished: NodeId) {
        self.sched.is_working = true;
        self.sched.is_committing = true;
        log::debug!(target: "weft.commit", "committing tree rooted at {}", finished.0);
        self.root.expiration_time = ExpirationTime::NONE;

        let first_effect = self.arena.node(finished).first_effect;
        self.commit_snapshot_pass(first_effect);
        self.commit_mutation_pass(first_effect);
        self.root.node = finished;
        self.commit_lifecycle_pass(first_effect);

        self.sched.is_committing = false;
        self.sched.is_working = false;
    }

    fn commit_snapshot_pass(&mut self, first_effect: Option<NodeId>) {
        let mut cursor = first_effect;
        while let Some(node) = cursor {
            let tag = self.arena.node(node).effect_tag;
            if tag.contains(EffectTag::SNAPSHOT) && !tag.contains(EffectTag::DELETION) {
                let instance_id = self.arena.node(node).instance;
                let current = self.arena.node(node).alternate;
                if let (Some(instance_id), Some(current_id)) = (instance_id, current) {
                    let prev_props = self.arena.node(current_id).memoized_props.clone();
                    let prev_state = self.arena.node(current_id).memoized_state.component_state();
                    let snapshot = match self.instances[instance_id.index()].as_ref() {
                        Some(instance) => instance.before_update(&prev_props, &prev_state),
                        None => None,
                    };
                    self.arena.node_mut(node).snapshot = snapshot;
                }
            }
            cursor = self.arena.node(node).next_effect;
        }
    }

    fn commit_mutation_pass(&mut self, first_effect: Option<NodeId>) {
        let mut cursor = first_effect;
        while let Some(node) = cursor {
            let next = self.arena.node(node).next_effect;
            let tag = self.arena.node(node).effect_tag
                & (EffectTag::PLACEMENT | EffectTag::UPDATE | EffectTag::DELETION);
            if tag.contains(EffectTag::DELETION) {
                self.commit_deletion(node);
            } else {
                if tag.contains(EffectTag::PLACEMENT) {
                    self.commit_placement(node);
                    self.arena.node_mut(node).effect_tag &= !EffectTag::PLACEMENT;
                }
                if tag.contains(EffectTag::UPDATE) {
                    self.commit_host_update(node);
                }
            }
            cursor = next;
        }
    }

    fn commit_lifecycle_pass(&mut self, first_effect: Option<NodeId>) {
        let mut cursor = first_effect;
        while let Some(node) = cursor {
            let tag = self.arena.node(node).effect_tag;
            let is_component = matches!(self.arena.node(node).kind, NodeKind::Component(_));
            if is_component && tag.contains(EffectTag::UPDATE) {
                self.commit_component_lifecycle(node);
            }
            cursor = self.arena.node(node).next_effect;
        }
    }

    fn commit_component_lifecycle(&mut self, node: NodeId) {
        let Some(instance_id) = self.arena.node(node).instance else {
            return;
        };
        let Some(mut instance) = self.instances[instance_id.index()].take() else {
            return;
        };
        let current = self.arena.node(node).alternate;
        let updater = Updater(node.0);
        match current {
            None => {
                let mut ctx = LifecycleCtx::new(updater, self);
                instance.on_mount(&mut ctx);
            }
            Some(current_id) => {
                let prev_props = self.arena.node(current_id).memoized_props.clone();
                let prev_state = self.arena.node(current_id).memoized_state.component_state();
                let snapshot = self.arena.node_mut(node).snapshot.take();
                let mut ctx = LifecycleCtx::new(updater, self);
                instance.on_update(&prev_props, &prev_state, snapshot, &mut ctx);
            }
        }
        self.instances[instance_id.index()] = Some(instance);
    }

    // ---- placement ----

    fn host_parent_of(&self, node: NodeId) -> HostParent<H> {
        let mut cursor = self.arena.node(node).parent;
        while let Some(id) = cursor {
            match &self.arena.node(id).kind {
                NodeKind::Host(_) => {
                    if let Some(instance) = &self.arena.node(id).host_instance {
                        return HostParent::Instance(instance.clone());
                    }
                }
                NodeKind::Root => return HostParent::Container,
                _ => {}
            }
            cursor = self.arena.node(id).parent;
        }
        HostParent::Container
    }

    fn attach_to_parent(&mut self, parent: &HostParent<H>, instance: &H::Instance) {
        match parent {
            HostParent::Container => self
                .host
                .append_child_to_container(&self.root.container, instance),
            HostParent::Instance(parent) => self.host.append_child(parent, instance),
        }
    }

    fn detach_from_parent(&mut self, parent: &HostParent<H>, instance: &H::Instance) {
        match parent {
            HostParent::Container => self
                .host
                .remove_child_from_container(&self.root.container, instance),
            HostParent::Instance(parent) => self.host.remove_child(parent, instance),
        }
    }

    /// Insert `node`'s host-bearing descendants into the nearest host
    /// parent, descending through non-host intermediate nodes.
    fn commit_placement(&mut self, node: NodeId) {
        let parent = self.host_parent_of(node);
        let mut cursor = node;
        loop {
            if self.arena.node(cursor).is_host() {
                let instance = self.arena.node(cursor).host_instance.clone();
                if let Some(instance) = instance {
                    self.attach_to_parent(&parent, &instance);
                }
            } else if let Some(child) = self.arena.node(cursor).child {
                self.arena.node_mut(child).parent = Some(cursor);
                cursor = child;
                continue;
            }
            if cursor == node {
                return;
            }
            loop {
                if let Some(sibling) = self.arena.node(cursor).sibling {
                    let cursor_parent = self.arena.node(cursor).parent;
                    self.arena.node_mut(sibling).parent = cursor_parent;
                    cursor = sibling;
                    break;
                }
                match self.arena.node(cursor).parent {
                    Some(parent_id) if parent_id != node => cursor = parent_id,
                    _ => return,
                }
            }
        }
    }

    fn commit_host_update(&mut self, node: NodeId) {
        if !self.arena.node(node).is_host() {
            return;
        }
        let instance = self.arena.node(node).host_instance.clone();
        let patch = self.arena.node_mut(node).host_patch.take();
        if let (Some(instance), Some(patch)) = (instance, patch) {
            self.host.commit_update(&instance, &patch);
        }
    }

    // ---- deletion ----

    /// Tear down a deleted subtree: every stateful node's `on_unmount`
    /// runs exactly once, before any of the subtree's host nodes detach.
    fn commit_deletion(&mut self, node: NodeId) {
        log::debug!(target: "weft.commit", "deleting subtree at {}", node.0);
        self.unmount_subtree(node);
        let parent = self.host_parent_of(node);
        self.detach_host_nodes(node, &parent);
        self.release_subtree(node);
    }

    fn unmount_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if matches!(self.arena.node(node).kind, NodeKind::Component(_)) {
                if let Some(instance_id) = self.arena.node(node).instance {
                    if let Some(mut instance) = self.instances[instance_id.index()].take() {
                        instance.on_unmount();
                    }
                }
            }
            // Reverse before pushing so siblings unmount left to right.
            let mut children = Vec::new();
            let mut child = self.arena.node(node).child;
            while let Some(id) = child {
                children.push(id);
                child = self.arena.node(id).sibling;
            }
            while let Some(id) = children.pop() {
                stack.push(id);
            }
        }
    }

    /// Remove the topmost host-bearing nodes of the doomed subtree from
    /// the host tree; their descendants go with them.
    fn detach_host_nodes(&mut self, node: NodeId, parent: &HostParent<H>) {
        if self.arena.node(node).is_host() {
            let instance = self.arena.node(node).host_instance.clone();
            if let Some(instance) = instance {
                self.detach_from_parent(parent, &instance);
            }
            return;
        }
        let mut child = self.arena.node(node).child;
        while let Some(id) = child {
            let sibling = self.arena.node(id).sibling;
            self.detach_host_nodes(id, parent);
            child = sibling;
        }
    }

    /// Sever the deleted pair's tree links; arena slots are not
    /// reclaimed, and the effect-list threading is left intact for the
    /// lifecycle pass still walking this commit's chain.
    fn release_subtree(&mut self, node: NodeId) {
        if let Some(queue_id) = self.arena.node(node).queue {
            self.queues[queue_id.index()] = None;
        }
        let alternate = self.arena.node(node).alternate;
        {
            let n = self.arena.node_mut(node);
            n.parent = None;
            n.alternate = None;
            n.effect_tag = EffectTag::empty();
        }
        if let Some(alternate) = alternate {
            let n = self.arena.node_mut(alternate);
            n.parent = None;
            n.alternate = None;
        }
    }
}

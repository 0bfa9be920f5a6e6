//! Positional child reconciliation.
//!
//! Contract:
//! - Matching is by list position, not by key: at each index, a type
//!   match reuses the existing node (clone-on-write with the new props),
//!   a mismatch deletes the old node and places a fresh one. Reordering
//!   therefore reuses by index; that behavior is deliberate.
//! - Surplus previous siblings are all deleted; surplus new descriptors
//!   are all created.
//! - Deletions are pushed to the front of the parent's effect list
//!   immediately, so they commit before placements and updates within
//!   the same parent.
//! - On first mount (no previous children) placement tracking is off;
//!   the subtree root carries the single Placement for the whole
//!   subtree.

use host_api::HostAdapter;

use element::{Children, Element, ElementKind};

use crate::clock::ExpirationTime;
use crate::node::{EffectTag, NodeId, NodeKind, WorkNode};
use crate::scheduler::Engine;

impl<H: HostAdapter> Engine<H> {
    pub(crate) fn reconcile_children(&mut self, wip: NodeId, next_children: Children) {
        let current = self.arena.node(wip).alternate;
        let current_first = current.and_then(|id| self.arena.node(id).child);
        let track_placements = current.is_some();
        let first = self.reconcile_child_list(wip, current_first, next_children, track_placements);
        self.arena.node_mut(wip).child = first;
    }

    fn reconcile_child_list(
        &mut self,
        parent: NodeId,
        current_first: Option<NodeId>,
        next_children: Children,
        track_placements: bool,
    ) -> Option<NodeId> {
        let expiration = self.sched.next_render_expiration;
        let descriptors: Vec<Element> = match next_children {
            Children::Elements(elements) => elements,
            // Scalar text is applied by the host fast path; no child
            // nodes exist for it.
            Children::Text(_) | Children::None => Vec::new(),
        };

        let mut first_new: Option<NodeId> = None;
        let mut prev_new: Option<NodeId> = None;
        let mut old = current_first;
        let mut index = 0;

        while index < descriptors.len() {
            let Some(old_id) = old else {
                break;
            };
            let element = &descriptors[index];
            let old_sibling = self.arena.node(old_id).sibling;

            let new_id = if self.arena.node(old_id).kind.matches(element.kind()) {
                let reused =
                    self.create_work_in_progress(old_id, Some(element.props().clone()), expiration);
                self.refresh_kind(reused, element.kind());
                self.arena.node_mut(reused).sibling = None;
                reused
            } else {
                self.delete_child(parent, old_id);
                let created = self.create_from_element(element, expiration);
                if track_placements {
                    self.arena.node_mut(created).effect_tag |= EffectTag::PLACEMENT;
                }
                created
            };
            self.arena.node_mut(new_id).parent = Some(parent);
            match prev_new {
                Some(prev) => self.arena.node_mut(prev).sibling = Some(new_id),
                None => first_new = Some(new_id),
            }
            prev_new = Some(new_id);
            old = old_sibling;
            index += 1;
        }

        // Previous siblings beyond the new list's length.
        while let Some(old_id) = old {
            let old_sibling = self.arena.node(old_id).sibling;
            self.delete_child(parent, old_id);
            old = old_sibling;
        }

        // New descriptors beyond the previous chain.
        while index < descriptors.len() {
            let created = self.create_from_element(&descriptors[index], expiration);
            if track_placements {
                self.arena.node_mut(created).effect_tag |= EffectTag::PLACEMENT;
            }
            self.arena.node_mut(created).parent = Some(parent);
            match prev_new {
                Some(prev) => self.arena.node_mut(prev).sibling = Some(created),
                None => first_new = Some(created),
            }
            prev_new = Some(created);
            index += 1;
        }

        first_new
    }

    fn create_from_element(&mut self, element: &Element, expiration: ExpirationTime) -> NodeId {
        let kind = NodeKind::from_element(element.kind());
        let mut node: WorkNode<H> = WorkNode::new(kind, element.props().clone());
        node.expiration_time = expiration;
        self.arena.alloc(node)
    }

    /// Carry non-identity payload of the element kind onto a reused node
    /// (a boundary's fallback may change between renders).
    fn refresh_kind(&mut self, node: NodeId, element_kind: &ElementKind) {
        if let ElementKind::Boundary { fallback } = element_kind {
            if let NodeKind::Boundary { fallback: slot } = &mut self.arena.node_mut(node).kind {
                *slot = fallback.clone();
            }
        }
    }

    /// Mark `child` (a current-side node) deleted and thread it at the
    /// front of the parent's effect list.
    fn delete_child(&mut self, parent: NodeId, child: NodeId) {
        log::trace!(target: "weft.diff", "deleting node {} under {}", child.0, parent.0);
        let old_first = self.arena.node(parent).first_effect;
        {
            let node = self.arena.node_mut(child);
            node.effect_tag |= EffectTag::DELETION;
            node.next_effect = old_first;
        }
        let parent_node = self.arena.node_mut(parent);
        parent_node.first_effect = Some(child);
        if parent_node.last_effect.is_none() {
            parent_node.last_effect = Some(child);
        }
    }
}

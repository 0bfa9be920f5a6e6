//! The ascend phase: finish a unit of work, accumulate the effect list.

use host_api::HostAdapter;

use crate::node::{EffectTag, NodeId, NodeKind};
use crate::scheduler::{Engine, EngineError};

impl<H: HostAdapter> Engine<H> {
    /// Ascend from `wip`: complete it, splice its effects into its
    /// parent, and return the next unit (a sibling to descend into, or
    /// nothing when the pass is done). Incomplete units unwind instead.
    pub(crate) fn complete_unit_of_work(
        &mut self,
        unit: NodeId,
    ) -> Result<Option<NodeId>, EngineError> {
        let mut wip = unit;
        loop {
            let parent = self.arena.node(wip).parent;
            let sibling = self.arena.node(wip).sibling;

            if !self.arena.node(wip).effect_tag.contains(EffectTag::INCOMPLETE) {
                self.complete_work(wip);
                if let Some(parent_id) = parent {
                    let parent_incomplete = self
                        .arena
                        .node(parent_id)
                        .effect_tag
                        .contains(EffectTag::INCOMPLETE);
                    if !parent_incomplete {
                        self.splice_effects_into_parent(parent_id, wip);
                    }
                }
                if let Some(sibling) = sibling {
                    return Ok(Some(sibling));
                }
                match parent {
                    Some(parent_id) => {
                        wip = parent_id;
                        continue;
                    }
                    None => return Ok(None),
                }
            }

            // Unwind path: this unit raised a suspension (or contains one).
            if let Some(boundary) = self.unwind_work(wip) {
                let node = self.arena.node_mut(boundary);
                node.effect_tag &= EffectTag::UNWIND_KEEP;
                node.first_effect = None;
                node.last_effect = None;
                return Ok(Some(boundary));
            }
            match parent {
                Some(parent_id) => {
                    let node = self.arena.node_mut(parent_id);
                    node.first_effect = None;
                    node.last_effect = None;
                    node.effect_tag |= EffectTag::INCOMPLETE;
                    wip = parent_id;
                    continue;
                }
                // The suspension raise already rejected boundary-less
                // trees; an incomplete root here means the pass is void.
                None => return Ok(None),
            }
        }
    }

    fn splice_effects_into_parent(&mut self, parent: NodeId, wip: NodeId) {
        let wip_first = self.arena.node(wip).first_effect;
        let wip_last = self.arena.node(wip).last_effect;

        if self.arena.node(parent).first_effect.is_none() {
            self.arena.node_mut(parent).first_effect = wip_first;
        }
        if let Some(wip_last) = wip_last {
            let parent_last = self.arena.node(parent).last_effect;
            if let Some(parent_last) = parent_last {
                self.arena.node_mut(parent_last).next_effect = wip_first;
            }
            self.arena.node_mut(parent).last_effect = Some(wip_last);
        }

        // Append the completed node itself after its subtree's effects.
        let tag = self.arena.node(wip).effect_tag;
        if tag.intersects(EffectTag::THREADED) {
            let parent_last = self.arena.node(parent).last_effect;
            match parent_last {
                Some(last) => self.arena.node_mut(last).next_effect = Some(wip),
                None => self.arena.node_mut(parent).first_effect = Some(wip),
            }
            self.arena.node_mut(parent).last_effect = Some(wip);
        }
    }

    fn complete_work(&mut self, wip: NodeId) {
        let tag = match &self.arena.node(wip).kind {
            NodeKind::Root | NodeKind::Component(_) | NodeKind::Boundary { .. } => return,
            NodeKind::Host(tag) => std::sync::Arc::clone(tag),
        };

        let current = self.arena.node(wip).alternate;
        let has_instance = self.arena.node(wip).host_instance.is_some();
        if let (Some(current_id), true) = (current, has_instance) {
            // Update pass: precompute the host property diff.
            let old_props = self.arena.node(current_id).memoized_props.clone();
            let new_props = self.arena.node(wip).pending_props.clone();
            let patch = self.host.prepare_update(&old_props, &new_props);
            let mark_update = patch.is_some();
            let node = self.arena.node_mut(wip);
            node.host_patch = patch;
            if mark_update {
                node.effect_tag |= EffectTag::UPDATE;
            }
        } else {
            // Initial pass: create the instance and attach the finished
            // host-bearing descendants while still detached.
            let new_props = self.arena.node(wip).pending_props.clone();
            let instance = self.host.create_instance(&tag, &new_props);
            self.append_all_children(&instance, wip);
            self.host.finalize_initial_children(&instance, &new_props);
            self.arena.node_mut(wip).host_instance = Some(instance);
        }
    }

    /// Attach every topmost host-bearing descendant of `wip` to `parent`,
    /// descending through non-host intermediate nodes.
    fn append_all_children(&mut self, parent: &H::Instance, wip: NodeId) {
        let Some(mut node) = self.arena.node(wip).child else {
            return;
        };
        loop {
            if self.arena.node(node).is_host() {
                let instance = self.arena.node(node).host_instance.clone();
                if let Some(instance) = instance {
                    self.host.append_initial_child(parent, &instance);
                }
            } else if let Some(child) = self.arena.node(node).child {
                self.arena.node_mut(child).parent = Some(node);
                node = child;
                continue;
            }
            if node == wip {
                return;
            }
            loop {
                if let Some(sibling) = self.arena.node(node).sibling {
                    let node_parent = self.arena.node(node).parent;
                    self.arena.node_mut(sibling).parent = node_parent;
                    node = sibling;
                    break;
                }
                match self.arena.node(node).parent {
                    Some(parent_id) if parent_id != wip => node = parent_id,
                    _ => return,
                }
            }
        }
    }
}

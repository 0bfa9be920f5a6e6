//! The descend phase: diff one node, produce its next child or nothing.

use std::rc::Rc;
use std::sync::Arc;

use element::{Awaitable, Children, ComponentType, Props, RenderCtx, Rendered, StateMap, Updater};
use host_api::HostAdapter;

use crate::clock::ExpirationTime;
use crate::node::{EffectTag, InstanceId, NodeId, NodeKind};
use crate::scheduler::{Engine, EngineError};
use crate::update_queue::NodeState;

pub(crate) enum BeginOutcome {
    /// Descend into this child, or complete when none.
    Next(Option<NodeId>),
    /// The render step is waiting on a value; unwind to a boundary.
    Suspended(Rc<dyn Awaitable>),
}

enum Branch {
    Root,
    Component(Arc<dyn ComponentType>),
    Host(Arc<str>),
    Boundary,
}

impl<H: HostAdapter> Engine<H> {
    pub(crate) fn begin_work(&mut self, wip: NodeId) -> Result<BeginOutcome, EngineError> {
        self.arena.node_mut(wip).expiration_time = ExpirationTime::NONE;
        let branch = match &self.arena.node(wip).kind {
            NodeKind::Root => Branch::Root,
            NodeKind::Component(ty) => Branch::Component(Arc::clone(ty)),
            NodeKind::Host(tag) => Branch::Host(Arc::clone(tag)),
            NodeKind::Boundary { .. } => Branch::Boundary,
        };
        match branch {
            Branch::Root => Ok(self.update_host_root(wip)),
            Branch::Component(ty) => self.update_component(wip, ty),
            Branch::Host(tag) => Ok(self.update_host_element(wip, &tag)),
            Branch::Boundary => Ok(self.update_boundary(wip)),
        }
    }

    fn update_host_root(&mut self, wip: NodeId) -> BeginOutcome {
        let prev_element = self.arena.node(wip).memoized_state.root_element();
        self.process_update_queue(wip);
        let next_element = self.arena.node(wip).memoized_state.root_element();

        let identical = match (&prev_element, &next_element) {
            (Some(prev), Some(next)) => Rc::ptr_eq(prev, next),
            _ => false,
        };
        if identical {
            self.clone_child_nodes(wip);
        } else {
            let children = match next_element {
                Some(element) => Children::Elements(vec![(*element).clone()]),
                None => Children::None,
            };
            self.reconcile_children(wip, children);
        }
        BeginOutcome::Next(self.arena.node(wip).child)
    }

    fn update_component(
        &mut self,
        wip: NodeId,
        ty: Arc<dyn ComponentType>,
    ) -> Result<BeginOutcome, EngineError> {
        let current = self.arena.node(wip).alternate;
        let new_props = self.arena.node(wip).pending_props.clone();

        if current.is_none() {
            // Mount: construct the instance and seed its state.
            let instance = ty.instantiate(&new_props);
            let initial = instance.initial_state();
            let instance_id = InstanceId(self.instances.len() as u32);
            self.instances.push(Some(instance));
            let node = self.arena.node_mut(wip);
            node.instance = Some(instance_id);
            node.memoized_state = NodeState::Component(initial);
            node.effect_tag |= EffectTag::UPDATE;
            self.process_update_queue(wip);
            let new_state = self.arena.node(wip).memoized_state.component_state();
            return self.finish_component(wip, new_props, new_state);
        }

        // Update: fold queued state, then bail or re-render.
        let old_props = self.arena.node(wip).memoized_props.clone();
        let old_state = self.arena.node(wip).memoized_state.component_state();
        self.process_update_queue(wip);
        let new_state = self.arena.node(wip).memoized_state.component_state();

        if old_props == new_props && old_state == new_state {
            self.arena.node_mut(wip).memoized_props = new_props;
            self.clone_child_nodes(wip);
            return Ok(BeginOutcome::Next(self.arena.node(wip).child));
        }

        let should_update = match self.arena.node(wip).instance {
            Some(instance_id) => match self.instances[instance_id.index()].as_ref() {
                Some(instance) => instance.should_update(&new_props, &new_state),
                None => true,
            },
            None => true,
        };
        if !should_update {
            // Memoize the folded result but keep the previous children.
            let node = self.arena.node_mut(wip);
            node.memoized_props = new_props;
            node.memoized_state = NodeState::Component(new_state);
            self.clone_child_nodes(wip);
            return Ok(BeginOutcome::Next(self.arena.node(wip).child));
        }

        self.arena.node_mut(wip).effect_tag |= EffectTag::SNAPSHOT | EffectTag::UPDATE;
        self.finish_component(wip, new_props, new_state)
    }

    fn finish_component(
        &mut self,
        wip: NodeId,
        new_props: Props,
        new_state: StateMap,
    ) -> Result<BeginOutcome, EngineError> {
        let Some(instance_id) = self.arena.node(wip).instance else {
            return Err(EngineError::UnknownNode(wip.0));
        };
        let ctx = RenderCtx::new(Updater(wip.0));
        let rendered = match self.instances[instance_id.index()].as_ref() {
            Some(instance) => instance.render(&ctx, &new_props, &new_state),
            None => Rendered::Ready(Children::None),
        };
        match rendered {
            Rendered::Suspended(awaitable) => Ok(BeginOutcome::Suspended(awaitable)),
            Rendered::Ready(children) => {
                self.reconcile_children(wip, children);
                let node = self.arena.node_mut(wip);
                node.memoized_props = new_props;
                node.memoized_state = NodeState::Component(new_state);
                Ok(BeginOutcome::Next(node.child))
            }
        }
    }

    fn update_host_element(&mut self, wip: NodeId, tag: &str) -> BeginOutcome {
        let next_props = self.arena.node(wip).pending_props.clone();
        let next_children = if self.host.should_set_text_content(tag, &next_props) {
            // Opaque text: the host applies it directly, no child nodes.
            Children::None
        } else {
            next_props.child_spec().clone()
        };
        self.reconcile_children(wip, next_children);
        self.arena.node_mut(wip).memoized_props = next_props;
        BeginOutcome::Next(self.arena.node(wip).child)
    }

    fn update_boundary(&mut self, wip: NodeId) -> BeginOutcome {
        let did_capture = self.arena.node(wip).effect_tag.contains(EffectTag::DID_CAPTURE);
        let next_props = self.arena.node(wip).pending_props.clone();
        let next_children = if did_capture {
            log::trace!(target: "weft.diff", "boundary {} renders its fallback", wip.0);
            match &self.arena.node(wip).kind {
                NodeKind::Boundary { fallback } => Children::Elements(fallback.clone()),
                _ => Children::None,
            }
        } else {
            next_props.child_spec().clone()
        };
        self.arena.node_mut(wip).memoized_state = NodeState::Boundary {
            showing_fallback: did_capture,
        };
        self.reconcile_children(wip, next_children);
        self.arena.node_mut(wip).memoized_props = next_props;
        BeginOutcome::Next(self.arena.node(wip).child)
    }
}

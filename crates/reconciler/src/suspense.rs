//! Suspension capture and retry.
//!
//! A render step that reports `Suspended` is a recoverable control-flow
//! condition, not an error: the nearest boundary above it captures the
//! signal and renders its fallback, and the settled awaitable re-requests
//! work at that boundary. With no boundary up the chain the signal is
//! fatal.

use std::rc::Rc;

use element::Awaitable;
use host_api::HostAdapter;

use crate::node::{EffectTag, NodeId, NodeKind};
use crate::scheduler::{Engine, EngineError};

impl<H: HostAdapter> Engine<H> {
    /// Handle a `Suspended` outcome from `unit`'s render step: discard
    /// its partial effect list, tag the nearest boundary to capture, and
    /// subscribe the retry continuation.
    pub(crate) fn raise_suspension(
        &mut self,
        unit: NodeId,
        awaitable: Rc<dyn Awaitable>,
    ) -> Result<(), EngineError> {
        {
            let node = self.arena.node_mut(unit);
            node.effect_tag |= EffectTag::INCOMPLETE;
            node.first_effect = None;
            node.last_effect = None;
        }

        let mut boundary = None;
        let mut cursor = self.arena.node(unit).parent;
        while let Some(id) = cursor {
            if matches!(self.arena.node(id).kind, NodeKind::Boundary { .. }) {
                boundary = Some(id);
                break;
            }
            cursor = self.arena.node(id).parent;
        }
        let Some(boundary) = boundary else {
            log::error!(
                target: "weft.schedule",
                "node {} suspended with no boundary above it",
                unit.0
            );
            return Err(EngineError::UnhandledSuspension);
        };

        log::trace!(
            target: "weft.schedule",
            "node {} suspended; boundary {} will capture",
            unit.0,
            boundary.0
        );
        self.arena.node_mut(boundary).effect_tag |= EffectTag::SHOULD_CAPTURE;

        // On settle — fulfilled or rejected alike — the boundary is
        // re-requested; the next deferred pass drains the inbox and
        // recomputes a priority for it.
        let inbox = Rc::clone(&self.retry_inbox);
        awaitable.on_settle(Box::new(move |_| {
            inbox.borrow_mut().push(boundary);
        }));
        Ok(())
    }

    /// Convert ShouldCapture to DidCapture on a boundary reached while
    /// unwinding; its restart renders the fallback subtree.
    pub(crate) fn unwind_work(&mut self, wip: NodeId) -> Option<NodeId> {
        let is_capturing_boundary = matches!(self.arena.node(wip).kind, NodeKind::Boundary { .. })
            && self
                .arena
                .node(wip)
                .effect_tag
                .contains(EffectTag::SHOULD_CAPTURE);
        if !is_capturing_boundary {
            return None;
        }
        let node = self.arena.node_mut(wip);
        node.effect_tag &= !EffectTag::SHOULD_CAPTURE;
        node.effect_tag |= EffectTag::DID_CAPTURE;
        Some(wip)
    }
}

//! The event batching dispatcher.
//!
//! Every host-delivered event enters a batching scope before listeners
//! run: state updates raised by listeners only accumulate, and exactly
//! one scheduling decision is made after the last listener returns — a
//! synchronous flush when a listener flagged a controlled input change,
//! a single deferred request otherwise.
//!
//! Listeners are invoked in two-phase order along the committed path
//! from the event's target to the root: capture listeners root-to-target,
//! then bubble listeners target-to-root.

use element::{EventScope, HostEvent, Listener, Updater};
use host_api::HostAdapter;

use crate::node::NodeId;
use crate::scheduler::{Engine, EngineError};

impl<H: HostAdapter> Engine<H> {
    pub fn dispatch_event(
        &mut self,
        target: Updater,
        event: &HostEvent,
    ) -> Result<(), EngineError> {
        let target = NodeId(target.0);
        if !self.arena.contains(target) {
            return Err(EngineError::UnknownNode(target.0));
        }
        log::trace!(
            target: "weft.events",
            "dispatching {:?} at node {}",
            event.kind,
            target.0
        );

        // Path target -> root on the committed tree.
        let mut path = vec![target];
        let mut cursor = self.arena.node(target).parent;
        while let Some(id) = cursor {
            path.push(id);
            cursor = self.arena.node(id).parent;
        }

        let prev_batching = self.sched.is_batching_updates;
        let prev_interactive = self.sched.is_batching_interactive;
        self.sched.is_batching_updates = true;
        self.sched.is_batching_interactive = event.kind.is_interactive();

        let mut scope = EventScope::new();
        for node in path.iter().rev() {
            self.invoke_listeners(*node, event, true, &mut scope);
        }
        for node in path.iter() {
            self.invoke_listeners(*node, event, false, &mut scope);
        }

        // Fold accumulated requests into queues while still batching:
        // they adjust priorities only, no pass runs.
        let pending = scope.take_pending();
        let mut result = Ok(());
        for (updater, partial) in pending {
            if let Err(err) = self.apply_state_change(updater, partial) {
                result = Err(err);
                break;
            }
        }

        self.sched.is_batching_updates = prev_batching;
        self.sched.is_batching_interactive = prev_interactive;
        result?;

        if self.sched.work_scheduled && !self.sched.is_rendering {
            if scope.controlled() {
                self.perform_sync_work()?;
            } else {
                self.schedule_callback_for(self.root.expiration_time);
            }
        }
        Ok(())
    }

    fn invoke_listeners(
        &mut self,
        node: NodeId,
        event: &HostEvent,
        capture: bool,
        scope: &mut EventScope,
    ) {
        let listeners: Vec<Listener> = self
            .arena
            .node(node)
            .memoized_props
            .listeners()
            .iter()
            .filter(|listener| listener.event == event.kind && listener.capture == capture)
            .cloned()
            .collect();
        for listener in listeners {
            (listener.handler)(event, scope);
        }
    }
}

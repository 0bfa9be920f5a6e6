//! Host event shapes and the listener-side view of a dispatch.

use std::sync::Arc;

use crate::component::Updater;
use crate::state::StateMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Change,
    Submit,
    KeyDown,
    PointerMove,
    Scroll,
}

impl EventKind {
    /// Interactive events take the short-horizon priority bucket.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, EventKind::PointerMove | EventKind::Scroll)
    }
}

/// One host-delivered event.
#[derive(Clone, Debug)]
pub struct HostEvent {
    pub kind: EventKind,
    /// Payload for value-bearing events (input/change).
    pub value: Option<Arc<str>>,
}

impl HostEvent {
    pub fn new(kind: EventKind) -> HostEvent {
        HostEvent { kind, value: None }
    }

    pub fn with_value(kind: EventKind, value: impl Into<Arc<str>>) -> HostEvent {
        HostEvent {
            kind,
            value: Some(value.into()),
        }
    }
}

/// Accumulator for everything listeners raise during one dispatch.
///
/// While a dispatch is batching, state-change requests only land here;
/// the dispatcher folds them into update queues and makes exactly one
/// scheduling decision after the last listener returns.
#[derive(Default)]
pub struct EventScope {
    pending: Vec<(Updater, StateMap)>,
    controlled: bool,
}

impl EventScope {
    pub fn new() -> EventScope {
        EventScope::default()
    }

    pub fn request_state_change(&mut self, updater: Updater, partial: StateMap) {
        self.pending.push((updater, partial));
    }

    /// Signal that a controlled input changed; the dispatch will flush
    /// synchronously instead of deferring.
    pub fn mark_controlled(&mut self) {
        self.controlled = true;
    }

    pub fn controlled(&self) -> bool {
        self.controlled
    }

    pub fn take_pending(&mut self) -> Vec<(Updater, StateMap)> {
        std::mem::take(&mut self.pending)
    }
}

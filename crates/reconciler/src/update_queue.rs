//! Per-node queues of pending partial-state payloads.
//!
//! Contract:
//! - Queues are created lazily, seeded with the node's last-memoized
//!   state as base.
//! - Payloads fold left-to-right; an absent payload is a no-op merge.
//! - Processing consumes the queued updates exactly once and leaves the
//!   folded result as the new base, so re-processing a drained queue is
//!   idempotent. Partially-drained queues are legal objects (a pass may
//!   restart after a capture).

use std::collections::VecDeque;
use std::rc::Rc;

use element::{Element, StateMap};

/// Last-committed internal state, by node kind.
#[derive(Clone, Debug, Default)]
pub enum NodeState {
    #[default]
    None,
    Root {
        element: Option<Rc<Element>>,
    },
    Component(StateMap),
    Boundary {
        showing_fallback: bool,
    },
}

impl NodeState {
    /// The component-state view; empty for other kinds.
    pub fn component_state(&self) -> StateMap {
        match self {
            NodeState::Component(map) => map.clone(),
            _ => StateMap::new(),
        }
    }

    pub fn root_element(&self) -> Option<Rc<Element>> {
        match self {
            NodeState::Root { element } => element.clone(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum UpdatePayload {
    /// Partial component state, shallow-merged into the base.
    State(StateMap),
    /// Replaces the root's rendered element.
    RootElement(Rc<Element>),
}

#[derive(Clone, Debug, Default)]
pub struct Update {
    pub payload: Option<UpdatePayload>,
}

impl Update {
    pub fn state(partial: StateMap) -> Update {
        Update {
            payload: Some(UpdatePayload::State(partial)),
        }
    }

    pub fn root_element(element: Rc<Element>) -> Update {
        Update {
            payload: Some(UpdatePayload::RootElement(element)),
        }
    }
}

pub struct UpdateQueue {
    base_state: NodeState,
    updates: VecDeque<Update>,
}

impl UpdateQueue {
    pub fn new(base_state: NodeState) -> UpdateQueue {
        UpdateQueue {
            base_state,
            updates: VecDeque::new(),
        }
    }

    pub fn append(&mut self, update: Update) {
        self.updates.push_back(update);
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Fold every queued payload into the base state, drain the queue,
    /// and return the result (also retained as the new base).
    pub fn process(&mut self) -> NodeState {
        let mut result = self.base_state.clone();
        while let Some(update) = self.updates.pop_front() {
            if let Some(payload) = update.payload {
                result = apply_payload(result, payload);
            }
        }
        self.base_state = result.clone();
        result
    }
}

fn apply_payload(state: NodeState, payload: UpdatePayload) -> NodeState {
    match payload {
        UpdatePayload::RootElement(element) => NodeState::Root {
            element: Some(element),
        },
        UpdatePayload::State(partial) => match state {
            NodeState::Component(map) => NodeState::Component(map.merged(&partial)),
            NodeState::None => NodeState::Component(partial),
            other => {
                log::debug!(
                    target: "weft.schedule",
                    "dropping partial-state payload against a non-component state"
                );
                other
            }
        },
    }
}

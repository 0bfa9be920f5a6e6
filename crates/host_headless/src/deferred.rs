//! A manually settled awaitable and render budgets for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use element::{Awaitable, Settlement, Value};
use host_api::RenderBudget;

#[derive(Default)]
struct DeferredState {
    settled: Option<Settlement>,
    subscribers: Vec<Box<dyn FnOnce(&Settlement)>>,
}

/// An awaitable the test settles by hand. Settles at most once;
/// subscribers added after settlement fire immediately.
#[derive(Clone, Default)]
pub struct Deferred {
    state: Rc<RefCell<DeferredState>>,
}

impl Deferred {
    pub fn new() -> Deferred {
        Deferred::default()
    }

    pub fn awaitable(&self) -> Rc<dyn Awaitable> {
        Rc::new(self.clone())
    }

    pub fn resolve(&self, value: Value) {
        self.settle(Settlement::Fulfilled(value));
    }

    pub fn reject(&self) {
        self.settle(Settlement::Rejected);
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled.is_some()
    }

    fn settle(&self, settlement: Settlement) {
        let subscribers = {
            let mut state = self.state.borrow_mut();
            if state.settled.is_some() {
                return;
            }
            state.settled = Some(settlement.clone());
            std::mem::take(&mut state.subscribers)
        };
        for subscriber in subscribers {
            subscriber(&settlement);
        }
    }
}

impl Awaitable for Deferred {
    fn on_settle(&self, callback: Box<dyn FnOnce(&Settlement)>) {
        let settled = self.state.borrow().settled.clone();
        match settled {
            Some(settlement) => callback(&settlement),
            None => self.state.borrow_mut().subscribers.push(callback),
        }
    }
}

/// Budget that reports ample time for a fixed number of polls, then
/// zero: deterministic yields without a real clock.
pub struct CountdownBudget {
    polls_left: Cell<u32>,
}

impl CountdownBudget {
    pub fn new(polls: u32) -> CountdownBudget {
        CountdownBudget {
            polls_left: Cell::new(polls),
        }
    }
}

impl RenderBudget for CountdownBudget {
    fn remaining(&self) -> Duration {
        let left = self.polls_left.get();
        if left == 0 {
            return Duration::ZERO;
        }
        self.polls_left.set(left - 1);
        Duration::from_millis(10)
    }
}

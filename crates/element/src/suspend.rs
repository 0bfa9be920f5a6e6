//! The non-exceptional suspension signal.
//!
//! Contract:
//! - An `Awaitable` settles at most once, but accepts any number of
//!   subscribers; subscribing after settlement invokes the callback
//!   immediately.
//! - Settlement outcome does not matter to the engine: fulfilled and
//!   rejected awaitables both retry the capturing boundary.

use std::rc::Rc;

use crate::element::Children;
use crate::props::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    Fulfilled(Value),
    Rejected,
}

/// Minimal subscribe-on-settle future, supplied by the host.
pub trait Awaitable {
    fn on_settle(&self, callback: Box<dyn FnOnce(&Settlement)>);
}

/// The outcome of a component's render step.
pub enum Rendered {
    Ready(Children),
    Suspended(Rc<dyn Awaitable>),
}

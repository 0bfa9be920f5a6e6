//! weft's incremental reconciliation engine.
//!
//! The engine maintains a double-buffered tree of work nodes mirroring a
//! declarative component tree, computes the minimal host mutations under
//! a priority/deadline model, and commits them in a snapshot / mutation /
//! lifecycle protocol. See the module docs of `scheduler`, `diff`, and
//! `commit` for the load-bearing invariants.

pub mod clock;
pub mod node;
pub mod update_queue;

mod begin;
mod commit;
mod complete;
mod diff;
mod events;
mod query;
mod scheduler;
mod suspense;

pub use crate::clock::ExpirationTime;
pub use crate::node::{EffectTag, NodeId, NodeKind};
pub use crate::scheduler::{Engine, EngineConfig, EngineError};
pub use crate::update_queue::{NodeState, Update, UpdatePayload, UpdateQueue};

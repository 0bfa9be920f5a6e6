//! The op journal: every host mutation, in application order.
//!
//! Invariants:
//! - Ops are recorded in the exact order the engine applied them; tests
//!   assert ordering properties (deletions before placements, unmounts
//!   before detaches) against this sequence.
//! - `key` values in create ops are fresh; all other references name
//!   existing nodes at the time they are recorded.

use std::sync::Arc;

use crate::HostKey;

#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    CreateInstance { key: HostKey, tag: String },
    AppendInitialChild { parent: HostKey, child: HostKey },
    FinalizeInitialChildren { key: HostKey },
    AppendChild { parent: HostKey, child: HostKey },
    AppendToContainer { child: HostKey },
    RemoveChild { parent: HostKey, child: HostKey },
    RemoveFromContainer { child: HostKey },
    CommitUpdate { key: HostKey },
    ScheduleCallback { timeout_ms: u64 },
}

/// Precomputed property diff between two prop snapshots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostPatch {
    pub set: Vec<(Arc<str>, String)>,
    pub removed: Vec<Arc<str>>,
    /// `Some(new_text)` when the opaque text content changed
    /// (`Some(None)` clears it).
    pub text: Option<Option<String>>,
}

impl HostPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.removed.is_empty() && self.text.is_none()
    }
}

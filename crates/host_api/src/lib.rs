//! The contract between the reconciler and a concrete host environment.
//!
//! Contract:
//! - `Instance` handles are cheap to clone and stable for the lifetime of
//!   the host node they name.
//! - The engine calls mutation methods only from inside a commit; a host
//!   never observes a half-reconciled tree.
//! - `prepare_update` must be pure; the returned patch is applied later,
//!   unmodified, by `commit_update`.
//! - `schedule_deferred_callback` registers intent only. The host fires
//!   the callback by invoking `Engine::perform_deferred_work` with a
//!   `RenderBudget`; the engine never assumes an event loop.

use std::time::Duration;

use element::Props;

pub trait HostAdapter {
    /// Handle to one created host node.
    type Instance: Clone;
    /// Handle to the mount container.
    type Container;
    /// Precomputed property diff payload, opaque to the engine.
    type Patch;

    /// Monotonic clock, in milliseconds.
    fn now_ms(&self) -> u64;

    /// Whether this element's children are opaque text the host applies
    /// directly, bypassing child node creation.
    fn should_set_text_content(&self, tag: &str, props: &Props) -> bool;

    fn create_instance(&mut self, tag: &str, props: &Props) -> Self::Instance;

    /// Attach a child while the parent is still detached (initial build).
    fn append_initial_child(&mut self, parent: &Self::Instance, child: &Self::Instance);

    /// Apply all initial properties (including text content) to a fresh node.
    fn finalize_initial_children(&mut self, instance: &Self::Instance, props: &Props);

    fn prepare_update(&self, old_props: &Props, new_props: &Props) -> Option<Self::Patch>;

    fn commit_update(&mut self, instance: &Self::Instance, patch: &Self::Patch);

    fn append_child(&mut self, parent: &Self::Instance, child: &Self::Instance);

    fn append_child_to_container(&mut self, container: &Self::Container, child: &Self::Instance);

    fn remove_child(&mut self, parent: &Self::Instance, child: &Self::Instance);

    fn remove_child_from_container(&mut self, container: &Self::Container, child: &Self::Instance);

    /// Ask the host to call back into the engine no later than `timeout`
    /// from now.
    fn schedule_deferred_callback(&mut self, timeout: Duration);
}

/// Remaining-time estimate injected into a deferred work pass.
pub trait RenderBudget {
    fn remaining(&self) -> Duration;
}

/// Budget that never yields; deferred passes run to completion.
pub struct UnlimitedBudget;

impl RenderBudget for UnlimitedBudget {
    fn remaining(&self) -> Duration {
        Duration::MAX
    }
}

//! The stateful-component authoring contract.
//!
//! Contract:
//! - `ComponentType` is the identity of a component kind; two element
//!   descriptions describe the same kind iff their type tokens match.
//! - `Component` instances are owned by the engine and live as long as
//!   the tree position they were mounted at.
//! - `render` must be pure over `(props, state)` apart from building
//!   listeners; it may report `Suspended` instead of children.
//! - Lifecycle hooks may request state changes through their context;
//!   those requests take effect on the next turn of the work loop, never
//!   re-entrantly.

use std::any::TypeId;

use crate::element::Children;
use crate::props::{Props, Value};
use crate::state::StateMap;
use crate::suspend::Rendered;

/// Opaque handle to the work-node position a component instance is
/// mounted at. Stable for the lifetime of the instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Updater(pub u32);

/// The identity and factory of one component kind.
pub trait ComponentType {
    fn name(&self) -> &str;

    fn instantiate(&self, props: &Props) -> Box<dyn Component>;

    /// Identity token; implementors return `TypeId::of::<Self>()`.
    fn type_token(&self) -> TypeId;
}

/// Receiver of state-change requests raised outside render (lifecycle
/// hooks, event listeners after batching resolves).
pub trait UpdateSink {
    fn request_state_change(&mut self, updater: Updater, partial: StateMap);
}

/// Context handed to `render`.
#[derive(Clone, Copy, Debug)]
pub struct RenderCtx {
    updater: Updater,
}

impl RenderCtx {
    pub fn new(updater: Updater) -> RenderCtx {
        RenderCtx { updater }
    }

    /// The updater listeners should capture to target this component.
    pub fn updater(&self) -> Updater {
        self.updater
    }
}

/// Context handed to mount/update lifecycle hooks.
pub struct LifecycleCtx<'a> {
    updater: Updater,
    sink: &'a mut dyn UpdateSink,
}

impl<'a> LifecycleCtx<'a> {
    pub fn new(updater: Updater, sink: &'a mut dyn UpdateSink) -> LifecycleCtx<'a> {
        LifecycleCtx { updater, sink }
    }

    pub fn updater(&self) -> Updater {
        self.updater
    }

    /// Enqueue a partial-state update against this component's node and
    /// request work at the currently computed priority.
    pub fn request_state_change(&mut self, partial: StateMap) {
        self.sink.request_state_change(self.updater, partial);
    }
}

pub trait Component {
    fn initial_state(&self) -> StateMap {
        StateMap::new()
    }

    fn render(&self, ctx: &RenderCtx, props: &Props, state: &StateMap) -> Rendered;

    fn should_update(&self, next_props: &Props, next_state: &StateMap) -> bool {
        let _ = (next_props, next_state);
        true
    }

    /// Pre-mutation snapshot, delivered back to `on_update`.
    fn before_update(&self, prev_props: &Props, prev_state: &StateMap) -> Option<Value> {
        let _ = (prev_props, prev_state);
        None
    }

    fn on_mount(&mut self, ctx: &mut LifecycleCtx<'_>) {
        let _ = ctx;
    }

    fn on_update(
        &mut self,
        prev_props: &Props,
        prev_state: &StateMap,
        snapshot: Option<Value>,
        ctx: &mut LifecycleCtx<'_>,
    ) {
        let _ = (prev_props, prev_state, snapshot, ctx);
    }

    fn on_unmount(&mut self) {}
}

/// Convenience for components whose render never suspends.
pub fn ready(children: Children) -> Rendered {
    Rendered::Ready(children)
}

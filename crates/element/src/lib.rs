pub mod component;
pub mod element;
pub mod events;
pub mod props;
pub mod resource;
pub mod state;
pub mod suspend;

pub use crate::component::{
    Component, ComponentType, LifecycleCtx, RenderCtx, UpdateSink, Updater,
};
pub use crate::element::{Children, Element, ElementKind};
pub use crate::events::{EventKind, EventScope, HostEvent};
pub use crate::props::{Listener, Props, Value};
pub use crate::resource::{Cache, Resource};
pub use crate::state::StateMap;
pub use crate::suspend::{Awaitable, Rendered, Settlement};

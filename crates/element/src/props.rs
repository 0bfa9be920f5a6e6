//! Property snapshots attached to element descriptions.
//!
//! Invariants:
//! - `Props` is a value snapshot: cloning it never shares mutable state.
//! - Data entries keep insertion order; appliers must not dedupe or sort.
//! - Listeners are not host-visible data. They compare by callback
//!   identity and are excluded from host property diffing.
//! - Children ride inside the props snapshot, as the declarative API
//!   produced them.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::element::Children;
use crate::events::{EventKind, EventScope, HostEvent};

/// A scalar property or state value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(Arc<str>),
    Number(f64),
    Bool(bool),
}

impl Value {
    pub fn text(text: impl Into<Arc<str>>) -> Value {
        Value::Text(text.into())
    }

    pub fn number(number: f64) -> Value {
        Value::Number(number)
    }

    pub fn bool(value: bool) -> Value {
        Value::Bool(value)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }
}

pub type ListenerFn = dyn Fn(&HostEvent, &mut EventScope);

/// An event listener carried in props.
#[derive(Clone)]
pub struct Listener {
    pub event: EventKind,
    pub capture: bool,
    pub handler: Rc<ListenerFn>,
}

impl Listener {
    /// A bubble-phase listener.
    pub fn new(event: EventKind, handler: impl Fn(&HostEvent, &mut EventScope) + 'static) -> Self {
        Listener {
            event,
            capture: false,
            handler: Rc::new(handler),
        }
    }

    /// A capture-phase listener.
    pub fn capture(
        event: EventKind,
        handler: impl Fn(&HostEvent, &mut EventScope) + 'static,
    ) -> Self {
        Listener {
            event,
            capture: true,
            handler: Rc::new(handler),
        }
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event
            && self.capture == other.capture
            && Rc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event", &self.event)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

/// The property snapshot of one element description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(Arc<str>, Value)>,
    listeners: Vec<Listener>,
    children: Children,
}

impl Props {
    pub fn new() -> Props {
        Props::default()
    }

    pub fn attr(mut self, name: impl Into<Arc<str>>, value: Value) -> Props {
        self.set(name, value);
        self
    }

    pub fn on(mut self, listener: Listener) -> Props {
        self.listeners.push(listener);
        self
    }

    pub fn children(mut self, children: Children) -> Props {
        self.children = children;
        self
    }

    pub fn set(&mut self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub fn entries(&self) -> &[(Arc<str>, Value)] {
        &self.entries
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn child_spec(&self) -> &Children {
        &self.children
    }

    /// The scalar text content, when the children are an opaque scalar.
    pub fn child_text(&self) -> Option<&str> {
        match &self.children {
            Children::Text(text) => Some(text),
            _ => None,
        }
    }
}

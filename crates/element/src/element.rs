//! Declarative element descriptions.
//!
//! An `Element` is an inert value describing one position of the desired
//! tree: a host tag, a stateful component type, or a suspense boundary.
//! The reconciler consumes these; nothing here touches a host.

use std::fmt;
use std::sync::Arc;

use crate::component::ComponentType;
use crate::props::Props;

#[derive(Clone)]
pub enum ElementKind {
    /// A host element, identified by its tag.
    Host(Arc<str>),
    /// A stateful component, identified by its type token.
    Component(Arc<dyn ComponentType>),
    /// A suspense boundary; `fallback` renders while a descendant is
    /// suspended, the props' children otherwise.
    Boundary { fallback: Vec<Element> },
}

impl PartialEq for ElementKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ElementKind::Host(a), ElementKind::Host(b)) => a == b,
            (ElementKind::Component(a), ElementKind::Component(b)) => {
                a.type_token() == b.type_token()
            }
            (ElementKind::Boundary { fallback: a }, ElementKind::Boundary { fallback: b }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
            ElementKind::Component(ty) => f.debug_tuple("Component").field(&ty.name()).finish(),
            ElementKind::Boundary { fallback } => f
                .debug_struct("Boundary")
                .field("fallback", &fallback.len())
                .finish(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    kind: ElementKind,
    props: Props,
}

impl Element {
    pub fn host(tag: impl Into<Arc<str>>, props: Props) -> Element {
        Element {
            kind: ElementKind::Host(tag.into()),
            props,
        }
    }

    pub fn component(ty: Arc<dyn ComponentType>, props: Props) -> Element {
        Element {
            kind: ElementKind::Component(ty),
            props,
        }
    }

    pub fn boundary(fallback: Vec<Element>, props: Props) -> Element {
        Element {
            kind: ElementKind::Boundary { fallback },
            props,
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn into_parts(self) -> (ElementKind, Props) {
        (self.kind, self.props)
    }
}

/// The declarative child description of one element: nothing, an opaque
/// scalar, or an ordered list of element descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Children {
    #[default]
    None,
    Text(Arc<str>),
    Elements(Vec<Element>),
}

impl Children {
    pub fn text(text: impl Into<Arc<str>>) -> Children {
        Children::Text(text.into())
    }

    /// Scalar numbers render as text content.
    pub fn number(number: f64) -> Children {
        Children::Text(format_number(number).into())
    }

    pub fn one(element: Element) -> Children {
        Children::Elements(vec![element])
    }

    pub fn list(elements: Vec<Element>) -> Children {
        Children::Elements(elements)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.is_finite() {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

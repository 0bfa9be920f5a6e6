//! The double-buffered work-node tree.
//!
//! Contract:
//! - Nodes are arena-allocated; every link (`parent`, `child`, `sibling`,
//!   `alternate`, effect-list threading) is a `NodeId` handle into the
//!   arena, never an owning reference.
//! - A node and its alternate never both represent "current"; exactly one
//!   side is reachable from the root at any time.
//! - `effect_tag` reflects only effects not yet committed; it is cleared
//!   when an alternate is reused for the next pass.
//! - The effect list is valid only for the just-completed pass and must
//!   be fully consumed or discarded before the next pass begins.
//! - Arena slots are never reclaimed; superseded nodes simply become
//!   unreachable.

use std::sync::Arc;

use bitflags::bitflags;
use element::{ComponentType, Element, ElementKind, Props};
use host_api::HostAdapter;

use crate::clock::ExpirationTime;
use crate::update_queue::NodeState;

/// Handle to one work node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an engine-owned update queue, shared by an alternate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueId(pub(crate) u32);

impl QueueId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an engine-owned component instance, shared by an alternate
/// pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EffectTag: u16 {
        const PLACEMENT      = 1 << 0;
        const UPDATE         = 1 << 1;
        const DELETION       = 1 << 2;
        const SNAPSHOT       = 1 << 3;
        const SHOULD_CAPTURE = 1 << 4;
        const DID_CAPTURE    = 1 << 5;
        const INCOMPLETE     = 1 << 6;

        /// Effects that thread a node onto the effect list.
        const THREADED = Self::PLACEMENT.bits()
            | Self::UPDATE.bits()
            | Self::DELETION.bits()
            | Self::SNAPSHOT.bits();
        /// Bits that survive an unwind restart.
        const UNWIND_KEEP = Self::THREADED.bits() | Self::DID_CAPTURE.bits();
    }
}

/// The closed set of node kinds, matched exhaustively in every phase.
#[derive(Clone)]
pub enum NodeKind {
    Root,
    Component(Arc<dyn ComponentType>),
    Host(Arc<str>),
    Boundary { fallback: Vec<Element> },
}

impl NodeKind {
    pub fn from_element(kind: &ElementKind) -> NodeKind {
        match kind {
            ElementKind::Host(tag) => NodeKind::Host(Arc::clone(tag)),
            ElementKind::Component(ty) => NodeKind::Component(Arc::clone(ty)),
            ElementKind::Boundary { fallback } => NodeKind::Boundary {
                fallback: fallback.clone(),
            },
        }
    }

    /// Type match for the positional diff. Boundary fallback contents do
    /// not participate in identity.
    pub fn matches(&self, element: &ElementKind) -> bool {
        match (self, element) {
            (NodeKind::Host(tag), ElementKind::Host(next)) => tag == next,
            (NodeKind::Component(ty), ElementKind::Component(next)) => {
                ty.type_token() == next.type_token()
            }
            (NodeKind::Boundary { .. }, ElementKind::Boundary { .. }) => true,
            _ => false,
        }
    }
}

pub struct WorkNode<H: HostAdapter> {
    pub kind: NodeKind,

    pub pending_props: Props,
    pub memoized_props: Props,
    pub memoized_state: NodeState,

    pub queue: Option<QueueId>,
    pub instance: Option<InstanceId>,
    pub host_instance: Option<H::Instance>,
    /// Precomputed host property diff, applied at commit.
    pub host_patch: Option<H::Patch>,
    /// Pre-mutation snapshot captured by the commit's first pass.
    pub snapshot: Option<element::Value>,

    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub sibling: Option<NodeId>,
    pub alternate: Option<NodeId>,

    pub effect_tag: EffectTag,
    pub next_effect: Option<NodeId>,
    pub first_effect: Option<NodeId>,
    pub last_effect: Option<NodeId>,

    pub expiration_time: ExpirationTime,
}

impl<H: HostAdapter> WorkNode<H> {
    pub fn new(kind: NodeKind, pending_props: Props) -> WorkNode<H> {
        WorkNode {
            kind,
            pending_props,
            memoized_props: Props::default(),
            memoized_state: NodeState::None,
            queue: None,
            instance: None,
            host_instance: None,
            host_patch: None,
            snapshot: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect_tag: EffectTag::empty(),
            next_effect: None,
            first_effect: None,
            last_effect: None,
            expiration_time: ExpirationTime::NONE,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.kind, NodeKind::Host(_))
    }
}

pub struct NodeArena<H: HostAdapter> {
    nodes: Vec<WorkNode<H>>,
}

impl<H: HostAdapter> NodeArena<H> {
    pub fn new() -> NodeArena<H> {
        NodeArena { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, node: WorkNode<H>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &WorkNode<H> {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut WorkNode<H> {
        &mut self.nodes[id.index()]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<H: HostAdapter> Default for NodeArena<H> {
    fn default() -> Self {
        NodeArena::new()
    }
}

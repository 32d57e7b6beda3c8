//! Node hierarchy for document trees.
//!
//! Every document is backed by a [`NodeArena`]: a slot table holding the
//! nodes of one tree. Nodes refer to each other (children, list members,
//! parent back-links) through generational [`NodeId`] handles rather than
//! owning pointers, so parent links can never form ownership cycles and a
//! handle to a freed node can never observe the slot's next occupant.
//!
//! # Node variants
//!
//! | Variant  | State                                                 |
//! |----------|-------------------------------------------------------|
//! | `Value`  | one scalar [`Value`]                                  |
//! | `Object` | insertion-ordered `name -> NodeId` map, names unique  |
//! | `List`   | member roots, an item template root, a cached view    |
//!
//! List members and templates are themselves document roots: `Object` nodes
//! with an empty name whose parent is the list.

mod arena;
mod decode;
mod encode;

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use arena::NodeArena;
pub(crate) use arena::type_mismatch;

use crate::value::Value;

/// Generational handle to a node inside a [`NodeArena`].
///
/// A handle stays valid until the node it names is freed. After that every
/// arena operation through the handle fails with
/// [`DocumentError::StaleHandle`](crate::doc::DocumentError::StaleHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Whether a node belongs to a pool scope or is independently owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PinMode {
    /// Never recycled; released when the last handle drops.
    #[default]
    Pinned,
    /// Owned by a [`PoolScope`](crate::pool::PoolScope) and reset when it ends.
    Reusable,
}

impl PinMode {
    pub fn is_pinned(self) -> bool {
        matches!(self, PinMode::Pinned)
    }
}

/// The variant of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Value,
    Object,
    List,
}

impl NodeType {
    /// Returns the type name as a string
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Value => "value",
            NodeType::Object => "object",
            NodeType::List => "list",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which parts of a tree a matcher visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// Only nodes that carry data: list templates are skipped.
    Data,
    /// Data nodes plus list templates, for operations that change shape.
    Shape,
}

/// One node of a document tree.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) revision: u64,
    pub(crate) state: NodeState,
}

#[derive(Debug)]
pub(crate) enum NodeState {
    Value(Value),
    Object(IndexMap<String, NodeId>),
    List(ListState),
}

impl NodeState {
    pub(crate) fn node_type(&self) -> NodeType {
        match self {
            NodeState::Value(_) => NodeType::Value,
            NodeState::Object(_) => NodeType::Object,
            NodeState::List(_) => NodeType::List,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ListState {
    pub(crate) members: Vec<NodeId>,
    pub(crate) template: NodeId,
    /// Member snapshot handed out to `DocumentList`s; dropped on every change.
    pub(crate) view: Option<Rc<[NodeId]>>,
}

/// One level of a node, copied out so the arena can be mutated while the
/// copy is walked.
pub(crate) enum Shallow {
    Value(Value),
    Object(Vec<(String, NodeId)>),
    List {
        template: NodeId,
        members: Vec<NodeId>,
    },
}

/// A write performed by [`Matcher::resolve_for_write`](crate::locator::Matcher::resolve_for_write).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    /// The object node that received the new child.
    pub parent: NodeId,
    /// The terminal name handed to the leaf factory.
    pub name: String,
    /// The node produced by the leaf factory.
    pub node: NodeId,
}

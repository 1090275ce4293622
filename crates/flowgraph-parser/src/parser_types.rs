//! Statement-level syntax produced by the grammar in [`parser`](super::parser)
//! and consumed by the diagram builder.

use flowgraph_core::semantic::{Direction, EdgeType, ShapeKind};

use crate::span::Span;

/// Explicit shape and label attached to a node reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeShape {
    pub kind: ShapeKind,
    pub label: String,
}

/// An identifier in a node position, optionally with a shape declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeRef {
    pub id: String,
    pub shape: Option<NodeShape>,
    /// Absolute byte range of the reference in the diagram text.
    pub span: Span,
}

/// A connector between two node lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub edge_type: EdgeType,
    pub label: Option<String>,
}

/// `A & B --> C -- text --> D`: a head node list followed by one or more
/// links, each to the next node list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chain {
    pub head: Vec<NodeRef>,
    pub links: Vec<(Link, Vec<NodeRef>)>,
}

/// Opening line of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubgraphHeader {
    /// Declared id; `None` when only a title was given.
    pub id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    Subgraph(SubgraphHeader),
    End,
    Direction(Direction),
    /// Styling and interaction statements that carry no graph structure.
    Unsupported(&'static str),
    Chain(Chain),
    Nodes(Vec<NodeRef>),
}

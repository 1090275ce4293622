//! Semantic graph model produced by the parser.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ extract + sanitize
//! Clean DSL text
//!     ↓ parser
//! Semantic Model (these types) - nodes, edges, groups
//!     ↓ layout (per-group, meta-graph)
//! Positioned boxes
//!     ↓ compose
//! Render Model (render module)
//! ```
//!
//! Everything here is created fresh for every parse; nothing is mutated after
//! the parser hands the [`Diagram`] over.

use std::fmt;

use serde::Serialize;

/// The visual shape of a leaf node.
///
/// Inferred from the bracket characters surrounding a node label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Diamond,
    Circle,
    Stadium,
    Rounded,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Circle => "circle",
            ShapeKind::Stadium => "stadium",
            ShapeKind::Rounded => "rounded",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of connector tokens the parser recognizes.
///
/// Longer spellings (`--->`, `====>`, `-..->`) map onto the same variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    /// `-->`
    #[default]
    Arrow,
    /// `---`
    Open,
    /// `-.->`
    Dotted,
    /// `-.-`
    DottedOpen,
    /// `==>`
    Thick,
    /// `===`
    ThickOpen,
    /// `--o`
    Circle,
    /// `--x`
    Cross,
    /// `<-->`
    Bidirectional,
    /// `~~~`
    Invisible,
}

impl EdgeType {
    /// The canonical connector spelling for this edge type.
    pub fn token(self) -> &'static str {
        match self {
            EdgeType::Arrow => "-->",
            EdgeType::Open => "---",
            EdgeType::Dotted => "-.->",
            EdgeType::DottedOpen => "-.-",
            EdgeType::Thick => "==>",
            EdgeType::ThickOpen => "===",
            EdgeType::Circle => "--o",
            EdgeType::Cross => "--x",
            EdgeType::Bidirectional => "<-->",
            EdgeType::Invisible => "~~~",
        }
    }

    /// Returns true if the edge is drawn with an arrow head at the target.
    pub fn has_arrow(self) -> bool {
        matches!(
            self,
            EdgeType::Arrow | EdgeType::Dotted | EdgeType::Thick | EdgeType::Bidirectional
        )
    }

    pub fn is_dotted(self) -> bool {
        matches!(self, EdgeType::Dotted | EdgeType::DottedOpen)
    }

    pub fn is_thick(self) -> bool {
        matches!(self, EdgeType::Thick | EdgeType::ThickOpen)
    }

    pub fn is_invisible(self) -> bool {
        matches!(self, EdgeType::Invisible)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Flow direction of a diagram or of a single group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// `TD` / `TB`
    #[default]
    TopBottom,
    /// `BT`
    BottomTop,
    /// `LR`
    LeftRight,
    /// `RL`
    RightLeft,
}

impl Direction {
    /// Parse a direction keyword (`TD`, `TB`, `BT`, `LR`, `RL`), case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Direction::TopBottom),
            "BT" => Some(Direction::BottomTop),
            "LR" => Some(Direction::LeftRight),
            "RL" => Some(Direction::RightLeft),
            _ => None,
        }
    }

    /// Returns true if ranks are laid out along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }

    /// Returns true if ranks grow toward negative coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomTop | Direction::RightLeft)
    }
}

/// A leaf element of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    id: String,
    label: String,
    shape: ShapeKind,
    group_id: Option<String>,
}

impl DiagramNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        shape: ShapeKind,
        group_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
            group_id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display text; may contain `\n` line breaks.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    /// The innermost enclosing group, `None` for standalone nodes.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }
}

/// A connection between two nodes or groups.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramEdge {
    source_id: String,
    target_id: String,
    label: Option<String>,
    edge_type: EdgeType,
}

impl DiagramEdge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        label: Option<String>,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            label,
            edge_type,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }
}

/// A named, possibly nested container of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: String,
    title: String,
    member_node_ids: Vec<String>,
    parent_group_id: Option<String>,
    direction: Option<Direction>,
}

impl Group {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        member_node_ids: Vec<String>,
        parent_group_id: Option<String>,
        direction: Option<Direction>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            member_node_ids,
            parent_group_id,
            direction,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Direct child node ids in discovery order. Nodes of nested groups are
    /// not included.
    pub fn member_node_ids(&self) -> &[String] {
        &self.member_node_ids
    }

    pub fn parent_group_id(&self) -> Option<&str> {
        self.parent_group_id.as_deref()
    }

    /// A `direction XX` statement inside the group, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_group_id.is_none()
    }
}

/// The complete parse result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    direction: Direction,
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
    groups: Vec<Group>,
}

impl Diagram {
    pub fn new(
        direction: Direction,
        nodes: Vec<DiagramNode>,
        edges: Vec<DiagramEdge>,
        groups: Vec<Group>,
    ) -> Self {
        Self {
            direction,
            nodes,
            edges,
            groups,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    /// Groups in the order they were opened; parents always precede children.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty()
    }
}

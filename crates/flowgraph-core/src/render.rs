//! Render model handed to the rendering layer.
//!
//! These are plain serializable records: positions are top-left corners,
//! relative to the parent group when [`RenderNode::parent_node`] is set and
//! absolute otherwise. Parents always precede their children in
//! [`RenderGraph::nodes`].

use serde::Serialize;

use crate::{
    color::{Color, ColorPair},
    geometry::{Point, Size},
    semantic::{EdgeType, ShapeKind},
};

/// Whether a render node is a group container or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderNodeKind {
    Group,
    Node,
}

/// Movement constraint for a child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    /// The node must stay inside its parent's bounds.
    Parent,
}

/// Marker drawn at the end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Marker {
    ArrowClosed,
    Circle,
    Cross,
}

/// A positioned node or group container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    id: String,
    kind: RenderNodeKind,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<ShapeKind>,
    position: Point,
    size: Size,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extent: Option<Extent>,
    style: ColorPair,
}

impl RenderNode {
    /// Create a group container record.
    pub fn group(
        id: impl Into<String>,
        title: impl Into<String>,
        position: Point,
        size: Size,
        style: ColorPair,
    ) -> Self {
        Self {
            id: id.into(),
            kind: RenderNodeKind::Group,
            label: title.into(),
            shape: None,
            position,
            size,
            parent_node: None,
            extent: None,
            style,
        }
    }

    /// Create a leaf node record.
    pub fn leaf(
        id: impl Into<String>,
        label: impl Into<String>,
        shape: ShapeKind,
        position: Point,
        size: Size,
        style: ColorPair,
    ) -> Self {
        Self {
            id: id.into(),
            kind: RenderNodeKind::Node,
            label: label.into(),
            shape: Some(shape),
            position,
            size,
            parent_node: None,
            extent: None,
            style,
        }
    }

    /// Attach the node to a parent group. The position is then read as
    /// relative to the parent and the node is constrained to its bounds.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_node = Some(parent_id.into());
        self.extent = Some(Extent::Parent);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RenderNodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> Option<ShapeKind> {
        self.shape
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn parent_node(&self) -> Option<&str> {
        self.parent_node.as_deref()
    }

    pub fn extent(&self) -> Option<Extent> {
        self.extent
    }

    pub fn style(&self) -> &ColorPair {
        &self.style
    }
}

/// Stroke attributes derived from an [`EdgeType`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStroke {
    animated: bool,
    dashed: bool,
    hidden: bool,
    stroke_width: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker_start: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker_end: Option<Marker>,
}

impl EdgeStroke {
    /// Resolve stroke attributes purely from the connector type.
    pub fn from_edge_type(edge_type: EdgeType) -> Self {
        let marker_end = match edge_type {
            EdgeType::Circle => Some(Marker::Circle),
            EdgeType::Cross => Some(Marker::Cross),
            edge_type if edge_type.has_arrow() => Some(Marker::ArrowClosed),
            _ => None,
        };
        let marker_start = (edge_type == EdgeType::Bidirectional).then_some(Marker::ArrowClosed);

        Self {
            animated: edge_type.is_dotted(),
            dashed: edge_type.is_dotted(),
            hidden: edge_type.is_invisible(),
            stroke_width: if edge_type.is_thick() { 3.5 } else { 1.5 },
            marker_start,
            marker_end,
        }
    }

    pub fn animated(&self) -> bool {
        self.animated
    }

    pub fn dashed(&self) -> bool {
        self.dashed
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn marker_start(&self) -> Option<Marker> {
        self.marker_start
    }

    pub fn marker_end(&self) -> Option<Marker> {
        self.marker_end
    }
}

/// A styled edge record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    id: String,
    source: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    edge_type: EdgeType,
    #[serde(flatten)]
    stroke: EdgeStroke,
    color: Color,
}

impl RenderEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: Option<String>,
        edge_type: EdgeType,
        color: Color,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label,
            edge_type,
            stroke: EdgeStroke::from_edge_type(edge_type),
            color,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn stroke(&self) -> &EdgeStroke {
        &self.stroke
    }

    pub fn color(&self) -> &Color {
        &self.color
    }
}

/// The complete composed output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn new(nodes: Vec<RenderNode>, edges: Vec<RenderEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RenderEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ColorPair {
        ColorPair::builtin("#ffffff", "#000000")
    }

    #[test]
    fn test_stroke_from_edge_type() {
        let arrow = EdgeStroke::from_edge_type(EdgeType::Arrow);
        assert_eq!(arrow.marker_end(), Some(Marker::ArrowClosed));
        assert!(!arrow.dashed() && !arrow.animated());

        let dotted = EdgeStroke::from_edge_type(EdgeType::DottedOpen);
        assert!(dotted.dashed() && dotted.animated());
        assert_eq!(dotted.marker_end(), None);

        let thick = EdgeStroke::from_edge_type(EdgeType::Thick);
        assert!(thick.stroke_width() > arrow.stroke_width());

        let both = EdgeStroke::from_edge_type(EdgeType::Bidirectional);
        assert_eq!(both.marker_start(), Some(Marker::ArrowClosed));

        assert_eq!(
            EdgeStroke::from_edge_type(EdgeType::Cross).marker_end(),
            Some(Marker::Cross)
        );
        assert!(EdgeStroke::from_edge_type(EdgeType::Invisible).hidden());
    }

    #[test]
    fn test_child_node_is_constrained_to_parent() {
        let node = RenderNode::leaf(
            "A",
            "A",
            ShapeKind::Rectangle,
            Point::new(1.0, 2.0),
            Size::new(10.0, 10.0),
            pair(),
        )
        .with_parent("g");

        assert_eq!(node.parent_node(), Some("g"));
        assert_eq!(node.extent(), Some(Extent::Parent));
        assert_eq!(node.kind(), RenderNodeKind::Node);
    }

    #[test]
    fn test_render_node_json_shape() {
        let node = RenderNode::group(
            "g",
            "Group",
            Point::new(0.0, 0.0),
            Size::new(100.0, 50.0),
            pair(),
        );
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["kind"], "group");
        assert_eq!(json["size"]["width"], 100.0);
        assert!(json.get("parentNode").is_none());
        assert_eq!(json["style"]["background"], "#ffffff");
    }

    #[test]
    fn test_render_edge_json_flattens_stroke() {
        let edge = RenderEdge::new(
            "e0",
            "A",
            "B",
            Some("yes".to_string()),
            EdgeType::Dotted,
            Color::new("#6366f1").unwrap(),
        );
        let json = serde_json::to_value(&edge).unwrap();

        assert_eq!(json["edgeType"], "dotted");
        assert_eq!(json["animated"], true);
        assert_eq!(json["markerEnd"], "arrowClosed");
        assert_eq!(json["color"], "#6366f1");
    }
}

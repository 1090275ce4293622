//! Composition of the render model from a diagram and its layout.

use log::{debug, warn};

use flowgraph_core::{
    color::{Color, default_edge_palette, group_colors, shape_colors},
    render::{RenderEdge, RenderGraph, RenderNode},
    semantic::Diagram,
};

use crate::{error::FlowgraphError, layout::DiagramLayout};

/// Build the render graph.
///
/// Group containers come first, parents before children, followed by leaf
/// nodes in parse order. Positions of nested items are relative to their
/// immediate group. Edges are emitted one per diagram edge, even when an
/// endpoint never became a node.
///
/// # Errors
///
/// Returns [`FlowgraphError::Layout`] if an item is missing from the layout.
pub fn compose(
    diagram: &Diagram,
    layout: &DiagramLayout,
    palette: &[Color],
) -> Result<RenderGraph, FlowgraphError> {
    let mut nodes = Vec::with_capacity(diagram.groups().len() + diagram.nodes().len());

    for group in diagram.groups() {
        let parent = group.parent_group_id();
        let record = layout
            .record_in(group.id(), parent)
            .ok_or_else(|| FlowgraphError::Layout(format!("Group `{}` was not laid out", group.id())))?;

        let node = RenderNode::group(
            group.id(),
            group.title(),
            record.position(),
            record.size(),
            group_colors(),
        );
        nodes.push(match parent {
            Some(parent) => node.with_parent(parent),
            None => node,
        });
    }

    for diagram_node in diagram.nodes() {
        let parent = diagram_node.group_id();
        let record = layout.record_in(diagram_node.id(), parent).ok_or_else(|| {
            FlowgraphError::Layout(format!("Node `{}` was not laid out", diagram_node.id()))
        })?;

        let node = RenderNode::leaf(
            diagram_node.id(),
            diagram_node.label(),
            diagram_node.shape(),
            record.position(),
            record.size(),
            shape_colors(diagram_node.shape()),
        );
        nodes.push(match parent {
            Some(parent) => node.with_parent(parent),
            None => node,
        });
    }

    let fallback;
    let palette = if palette.is_empty() {
        fallback = default_edge_palette();
        fallback.as_slice()
    } else {
        palette
    };

    let known = |id: &str| diagram.node(id).is_some() || diagram.group(id).is_some();
    let edges = diagram
        .edges()
        .iter()
        .enumerate()
        .map(|(idx, edge)| {
            if !known(edge.source_id()) || !known(edge.target_id()) {
                warn!(
                    source = edge.source_id(),
                    target = edge.target_id();
                    "Edge endpoint is not a node or group"
                );
            }
            RenderEdge::new(
                format!("e{idx}-{}-{}", edge.source_id(), edge.target_id()),
                edge.source_id(),
                edge.target_id(),
                edge.label().map(str::to_string),
                edge.edge_type(),
                palette[idx % palette.len()].clone(),
            )
        })
        .collect();

    let graph = RenderGraph::new(nodes, edges);
    debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len();
        "Composed render graph"
    );
    Ok(graph)
}

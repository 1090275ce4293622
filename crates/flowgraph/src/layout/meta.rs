//! Meta-graph layout phase: top-level groups and standalone nodes as boxes.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::trace;

use flowgraph_core::geometry::Size;

use super::{GroupLayout, Hierarchy, LayeredGraph, LayoutRecord, group_size};
use crate::{config::LayoutConfig, error::FlowgraphError};

/// Place every top-level box. Positions are absolute top-left corners with
/// the bounding box of all boxes starting at the origin.
///
/// Each unordered pair of boxes contributes at most one edge, oriented like
/// the first diagram edge that induced it.
pub(crate) fn layout_meta(
    hierarchy: &Hierarchy<'_>,
    groups: &IndexMap<String, GroupLayout>,
    node_sizes: &HashMap<&str, Size>,
    config: &LayoutConfig,
) -> Result<IndexMap<String, LayoutRecord>, FlowgraphError> {
    let diagram = hierarchy.diagram();

    let mut items: Vec<(&str, Size)> = diagram
        .groups()
        .iter()
        .filter(|group| group.is_top_level())
        .map(|group| (group.id(), group_size(group.id(), group.title(), groups, config)))
        .collect();
    items.extend(
        diagram
            .nodes()
            .iter()
            .filter(|node| node.group_id().is_none())
            .filter_map(|node| node_sizes.get(node.id()).map(|&size| (node.id(), size))),
    );
    if items.is_empty() {
        return Ok(IndexMap::new());
    }

    let index: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, &(id, _))| (id, idx))
        .collect();
    let mut graph = LayeredGraph::new(items.iter().map(|&(_, size)| size).collect());
    let mut pairs = HashSet::new();
    for edge in diagram.edges() {
        let resolve = |id: &str| {
            hierarchy
                .item_in_scope(id, None)
                .and_then(|item| index.get(item).copied())
        };
        let (Some(source), Some(target)) = (resolve(edge.source_id()), resolve(edge.target_id()))
        else {
            continue;
        };
        if source != target && pairs.insert((source.min(target), source.max(target))) {
            graph.add_edge(source, target);
        }
    }

    trace!(boxes = items.len(), edges = graph.edge_count(); "Laying out meta-graph");
    let placement = graph.layout(diagram.direction(), config.meta())?;

    Ok(items
        .iter()
        .zip(placement.positions())
        .map(|(&(id, size), &position)| (id.to_string(), LayoutRecord::new(position, size)))
        .collect())
}

#[cfg(test)]
mod tests {
    use flowgraph_core::semantic::{
        Diagram, DiagramEdge, DiagramNode, Direction, EdgeType, Group, ShapeKind,
    };

    use super::*;
    use crate::layout::group::layout_groups;

    fn layout(diagram: &Diagram) -> IndexMap<String, LayoutRecord> {
        let config = LayoutConfig::default();
        let hierarchy = Hierarchy::new(diagram);
        let sizes: HashMap<&str, Size> = diagram
            .nodes()
            .iter()
            .map(|n| (n.id(), Size::new(100.0, 40.0)))
            .collect();
        let groups = layout_groups(&hierarchy, &sizes, &config).unwrap();
        layout_meta(&hierarchy, &groups, &sizes, &config).unwrap()
    }

    fn node(id: &str, group: Option<&str>) -> DiagramNode {
        DiagramNode::new(id, id, ShapeKind::Rectangle, group.map(String::from))
    }

    fn edge(source: &str, target: &str) -> DiagramEdge {
        DiagramEdge::new(source, target, None, EdgeType::Arrow)
    }

    #[test]
    fn test_empty_diagram() {
        assert!(layout(&Diagram::default()).is_empty());
    }

    #[test]
    fn test_boxes_are_groups_and_standalone_nodes() {
        let diagram = Diagram::new(
            Direction::TopBottom,
            vec![node("a", Some("g")), node("b", Some("h")), node("c", None)],
            vec![edge("a", "b"), edge("b", "a"), edge("a", "c")],
            vec![
                Group::new("g", "G", vec!["a".into()], None, None),
                Group::new("h", "H", vec!["b".into()], Some("g".into()), None),
            ],
        );
        let records = layout(&diagram);

        assert_eq!(records.keys().collect::<Vec<_>>(), vec!["g", "c"]);
        assert!(records["g"].position().y() < records["c"].position().y());

        let min_x = records.values().map(|r| r.position().x()).fold(f32::MAX, f32::min);
        let min_y = records.values().map(|r| r.position().y()).fold(f32::MAX, f32::min);
        assert_eq!((min_x, min_y), (0.0, 0.0));
    }

    #[test]
    fn test_opposite_edges_induce_one_meta_edge() {
        let diagram = Diagram::new(
            Direction::LeftRight,
            vec![node("a", Some("g")), node("b", Some("h"))],
            vec![edge("a", "b"), edge("b", "a"), edge("a", "b")],
            vec![
                Group::new("g", "G", vec!["a".into()], None, None),
                Group::new("h", "H", vec!["b".into()], None, None),
            ],
        );
        let records = layout(&diagram);

        let (g, h) = (records["g"].bounds(), records["h"].bounds());
        assert!(!g.intersects(&h));
        assert!(g.max_x() + LayoutConfig::default().meta().rank_separation() <= h.min_x() + 1e-3);
        assert_eq!(g.min_x(), 0.0);
    }

    #[test]
    fn test_edges_to_group_ids_resolve_to_the_group() {
        let diagram = Diagram::new(
            Direction::TopBottom,
            vec![node("a", Some("g")), node("start", None)],
            vec![edge("start", "g")],
            vec![Group::new("g", "G", vec!["a".into()], None, None)],
        );
        let records = layout(&diagram);

        assert!(records["start"].position().y() < records["g"].position().y());
    }
}

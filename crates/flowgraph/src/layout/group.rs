//! Per-group layout phase.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use flowgraph_core::geometry::Size;

use super::{GroupLayout, Hierarchy, LayeredGraph, LayoutRecord, group_size, title_width};
use crate::{config::LayoutConfig, error::FlowgraphError};

/// Lay out the contents of every non-empty group.
///
/// Groups are visited in reverse declaration order. A group is always
/// declared after its parent, so every child is finished before its parent
/// needs the child's size.
pub(crate) fn layout_groups(
    hierarchy: &Hierarchy<'_>,
    node_sizes: &HashMap<&str, Size>,
    config: &LayoutConfig,
) -> Result<IndexMap<String, GroupLayout>, FlowgraphError> {
    let diagram = hierarchy.diagram();
    let mut layouts = IndexMap::new();

    for group in diagram.groups().iter().rev() {
        let scope = Some(group.id());

        let mut items: Vec<(&str, Size)> = group
            .member_node_ids()
            .iter()
            .filter_map(|id| node_sizes.get(id.as_str()).map(|&size| (id.as_str(), size)))
            .collect();
        items.extend(hierarchy.child_groups(scope).filter_map(|child| {
            let title = diagram.group(child)?.title();
            Some((child, group_size(child, title, &layouts, config)))
        }));

        if items.is_empty() {
            debug!(group = group.id(); "Skipping empty group");
            continue;
        }

        let index: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(idx, &(id, _))| (id, idx))
            .collect();
        let mut graph = LayeredGraph::new(items.iter().map(|&(_, size)| size).collect());
        for edge in diagram.edges() {
            let resolve = |id: &str| {
                hierarchy
                    .item_in_scope(id, scope)
                    .and_then(|item| index.get(item).copied())
            };
            let source = resolve(edge.source_id());
            let target = resolve(edge.target_id());
            if let (Some(source), Some(target)) = (source, target) {
                graph.add_edge(source, target);
            }
        }

        let direction = hierarchy.direction_of(group.id());
        trace!(
            group = group.id(),
            items = items.len(),
            edges = graph.edge_count(),
            direction:? = direction;
            "Laying out group"
        );
        let placement = graph.layout(direction, config.group())?;

        let insets = config.group_insets();
        let offset = insets.content_origin();
        let children = items
            .iter()
            .zip(placement.positions())
            .map(|(&(id, size), &position)| {
                (id.to_string(), LayoutRecord::new(position.add_point(offset), size))
            })
            .collect();

        let size = placement
            .size()
            .add_padding(insets)
            .max(Size::new(title_width(group.title(), config), 0.0));
        layouts.insert(group.id().to_string(), GroupLayout { size, children });
    }

    // Parents first, matching declaration order.
    layouts.reverse();
    Ok(layouts)
}

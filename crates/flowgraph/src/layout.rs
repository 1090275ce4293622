//! Two-phase layout of a parsed [`Diagram`].
//!
//! 1. Group phase: every non-empty group is laid out on its own, innermost
//!    first, so a parent sees its child groups as opaque boxes of known size.
//! 2. Meta phase: top-level groups and standalone nodes are laid out as boxes.
//!
//! The result is a [`DiagramLayout`]: positions relative to the enclosing
//! group (or absolute for top-level items) plus sizes, which the
//! composition phase turns into render records.

mod engine;
mod group;
mod meta;
mod sizing;

pub use engine::{LayeredGraph, Placement};
pub use sizing::{empty_group_size, node_size, title_width};

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};

use flowgraph_core::{
    geometry::{Bounds, Point, Size},
    semantic::{Diagram, Direction},
};

use crate::{config::LayoutConfig, error::FlowgraphError};

/// Position (top-left corner) and size of a laid out item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutRecord {
    position: Point,
    size: Size,
}

impl LayoutRecord {
    pub fn new(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size)
    }
}

/// Internal layout of one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupLayout {
    size: Size,
    children: IndexMap<String, LayoutRecord>,
}

impl GroupLayout {
    /// Total size of the group box, header and padding included.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Direct member nodes and child groups, positioned relative to the
    /// group's top-left corner.
    pub fn children(&self) -> &IndexMap<String, LayoutRecord> {
        &self.children
    }
}

/// Layout of a whole diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramLayout {
    groups: IndexMap<String, GroupLayout>,
    top_level: IndexMap<String, LayoutRecord>,
}

impl DiagramLayout {
    /// Internal layout of a group. Empty groups have none.
    pub fn group(&self, id: &str) -> Option<&GroupLayout> {
        self.groups.get(id)
    }

    /// Absolute placement of top-level groups and standalone nodes.
    pub fn top_level(&self) -> &IndexMap<String, LayoutRecord> {
        &self.top_level
    }

    /// Placement of an item inside `parent`, or at the top level when
    /// `parent` is `None`.
    pub fn record_in(&self, id: &str, parent: Option<&str>) -> Option<LayoutRecord> {
        match parent {
            Some(parent) => self.groups.get(parent)?.children.get(id).copied(),
            None => self.top_level.get(id).copied(),
        }
    }
}

/// Compute the layout of a diagram.
///
/// # Errors
///
/// Returns [`FlowgraphError::Config`] if `config` holds unusable values
/// (it may come straight from a deserializer) and
/// [`FlowgraphError::Layout`] if the layered layout of any scope fails.
pub fn layout_diagram(
    diagram: &Diagram,
    config: &LayoutConfig,
) -> Result<DiagramLayout, FlowgraphError> {
    config.validate()?;

    let hierarchy = Hierarchy::new(diagram);
    let node_sizes: HashMap<&str, Size> = diagram
        .nodes()
        .iter()
        .map(|node| (node.id(), node_size(node.label(), node.shape(), config.node())))
        .collect();

    let groups = group::layout_groups(&hierarchy, &node_sizes, config)?;
    debug!(laid_out = groups.len(), total = diagram.groups().len(); "Group layouts computed");

    let top_level = meta::layout_meta(&hierarchy, &groups, &node_sizes, config)?;
    info!(boxes = top_level.len(); "Meta layout computed");

    Ok(DiagramLayout { groups, top_level })
}

/// Containment lookups over a diagram's nodes and groups.
pub(crate) struct Hierarchy<'a> {
    diagram: &'a Diagram,
    /// Every node and group id mapped to its enclosing group.
    parents: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> Hierarchy<'a> {
    pub fn new(diagram: &'a Diagram) -> Self {
        let mut parents = HashMap::new();
        for group in diagram.groups() {
            parents.insert(group.id(), group.parent_group_id());
        }
        for node in diagram.nodes() {
            parents.insert(node.id(), node.group_id());
        }
        Self { diagram, parents }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    /// The item that represents `id` among the direct children of `scope`
    /// (`None` is the top level).
    ///
    /// That is `id` itself when it sits directly in `scope`, or the child
    /// group of `scope` that contains it. Returns `None` for unknown ids,
    /// ids outside `scope` and `scope` itself.
    pub fn item_in_scope(&self, id: &str, scope: Option<&str>) -> Option<&'a str> {
        let (mut current, mut parent) = self.parents.get_key_value(id).map(|(&k, &v)| (k, v))?;
        loop {
            if parent == scope {
                return Some(current);
            }
            let container = parent?;
            current = container;
            parent = self.parents.get(container).copied().flatten();
        }
    }

    /// Direction for the contents of a group: its own, else the nearest
    /// ancestor's, else the diagram's.
    pub fn direction_of(&self, group_id: &str) -> Direction {
        let mut current = self.diagram.group(group_id);
        while let Some(group) = current {
            if let Some(direction) = group.direction() {
                return direction;
            }
            current = group
                .parent_group_id()
                .and_then(|parent| self.diagram.group(parent));
        }
        self.diagram.direction()
    }

    /// Ids of the direct child groups of `scope`, in declaration order.
    pub fn child_groups(&self, scope: Option<&str>) -> impl Iterator<Item = &'a str> {
        self.diagram
            .groups()
            .iter()
            .filter(move |group| group.parent_group_id() == scope)
            .map(|group| group.id())
    }
}

/// Size of a group box, whether or not it has a layout of its own.
fn group_size(
    id: &str,
    title: &str,
    groups: &IndexMap<String, GroupLayout>,
    config: &LayoutConfig,
) -> Size {
    groups
        .get(id)
        .map_or_else(|| empty_group_size(title, config), GroupLayout::size)
}

#[cfg(test)]
mod tests {
    use flowgraph_core::semantic::{DiagramNode, Group};

    use super::*;

    fn nested() -> Diagram {
        Diagram::new(
            Direction::TopBottom,
            vec![
                DiagramNode::new("a", "A", Default::default(), Some("inner".to_string())),
                DiagramNode::new("b", "B", Default::default(), Some("outer".to_string())),
                DiagramNode::new("c", "C", Default::default(), None),
            ],
            Vec::new(),
            vec![
                Group::new("outer", "Outer", vec!["b".to_string()], None, None),
                Group::new(
                    "inner",
                    "Inner",
                    vec!["a".to_string()],
                    Some("outer".to_string()),
                    Some(Direction::LeftRight),
                ),
                Group::new("lonely", "Lonely", Vec::new(), Some("inner".to_string()), None),
            ],
        )
    }

    #[test]
    fn test_item_in_scope() {
        let diagram = nested();
        let hierarchy = Hierarchy::new(&diagram);

        assert_eq!(hierarchy.item_in_scope("a", None), Some("outer"));
        assert_eq!(hierarchy.item_in_scope("a", Some("outer")), Some("inner"));
        assert_eq!(hierarchy.item_in_scope("a", Some("inner")), Some("a"));
        assert_eq!(hierarchy.item_in_scope("c", None), Some("c"));
        assert_eq!(hierarchy.item_in_scope("c", Some("outer")), None);
        assert_eq!(hierarchy.item_in_scope("outer", Some("outer")), None);
        assert_eq!(hierarchy.item_in_scope("inner", Some("outer")), Some("inner"));
        assert_eq!(hierarchy.item_in_scope("missing", None), None);
    }

    #[test]
    fn test_direction_is_inherited() {
        let diagram = nested();
        let hierarchy = Hierarchy::new(&diagram);

        assert_eq!(hierarchy.direction_of("outer"), Direction::TopBottom);
        assert_eq!(hierarchy.direction_of("inner"), Direction::LeftRight);
        assert_eq!(hierarchy.direction_of("lonely"), Direction::LeftRight);
    }

    #[test]
    fn test_child_groups() {
        let diagram = nested();
        let hierarchy = Hierarchy::new(&diagram);

        assert_eq!(hierarchy.child_groups(None).collect::<Vec<_>>(), vec!["outer"]);
        assert_eq!(
            hierarchy.child_groups(Some("inner")).collect::<Vec<_>>(),
            vec!["lonely"]
        );
    }
}

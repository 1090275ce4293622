//! Layered (Sugiyama) layout of one scope.
//!
//! A [`LayeredGraph`] is built fresh for every scope and discarded after
//! [`LayeredGraph::layout`] returns; nothing is shared between calls.
//!
//! Ranking and crossing minimization come from `rust-sugiyama`. Its output
//! only carries ranks and an in-rank order that we trust; coordinates are
//! reassigned here from the real box sizes. Cycles are broken beforehand
//! with petgraph's greedy feedback arc set. If `rust-sugiyama` panics or
//! returns something unusable, a longest-path layering is used instead.
//!
//! Everything is computed top-to-bottom. Horizontal directions transpose
//! the sizes going in and the positions coming out; bottom-up directions
//! mirror the rank axis.

use std::{
    collections::{HashMap, HashSet},
    panic,
};

use log::{debug, warn};
use petgraph::{
    algo::{greedy_feedback_arc_set, toposort},
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use rust_sugiyama::configure::Config;

use flowgraph_core::{
    geometry::{Point, Size},
    semantic::Direction,
};

use crate::{config::SpacingConfig, error::FlowgraphError};

/// Items of one rank with the center x each would like to sit at.
type Rank = Vec<(usize, f32)>;

/// Ranks of one connected component, top to bottom.
type Component = Vec<Rank>;

/// Result of laying out a scope: top-left corners indexed like the input
/// sizes, with the bounding box starting at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    positions: Vec<Point>,
    size: Size,
}

impl Placement {
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Size of the tight bounding box around all items.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// A directed graph of sized boxes.
#[derive(Debug, Clone, Default)]
pub struct LayeredGraph {
    sizes: Vec<Size>,
    /// Distinct edges in insertion order.
    edges: Vec<(usize, usize)>,
    seen: HashSet<(usize, usize)>,
}

impl LayeredGraph {
    pub fn new(sizes: Vec<Size>) -> Self {
        Self {
            sizes,
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add an edge between two items. Self-loops and repeated edges are
    /// ignored, they carry no layering information.
    pub fn add_edge(&mut self, source: usize, target: usize) {
        if source == target || source >= self.sizes.len() || target >= self.sizes.len() {
            return;
        }
        if self.seen.insert((source, target)) {
            self.edges.push((source, target));
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Lay out the graph in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`FlowgraphError::Layout`] if the computed geometry is not
    /// finite.
    pub fn layout(
        &self,
        direction: Direction,
        spacing: &SpacingConfig,
    ) -> Result<Placement, FlowgraphError> {
        if self.sizes.is_empty() {
            return Ok(Placement {
                positions: Vec::new(),
                size: Size::default(),
            });
        }

        let horizontal = direction.is_horizontal();
        let sizes: Vec<Size> = if horizontal {
            self.sizes.iter().map(|size| size.transpose()).collect()
        } else {
            self.sizes.clone()
        };

        let edges = self.acyclic_edges();
        let components = self.components(&edges, &sizes, spacing);

        let mut positions = vec![Point::default(); sizes.len()];
        let mut cursor = 0.0_f32;
        let mut width = 0.0_f32;
        let mut height = 0.0_f32;
        for component in &components {
            let size = place_component(component, &sizes, spacing, cursor, &mut positions);
            width = cursor + size.width();
            height = height.max(size.height());
            cursor = width + spacing.node_separation();
        }

        if direction.is_reversed() {
            for (position, size) in positions.iter_mut().zip(&sizes) {
                *position = Point::new(position.x(), height - position.y() - size.height());
            }
        }

        let (positions, size) = if horizontal {
            (
                positions.into_iter().map(Point::transpose).collect(),
                Size::new(height, width),
            )
        } else {
            (positions, Size::new(width, height))
        };

        let finite = positions
            .iter()
            .all(|point| point.x().is_finite() && point.y().is_finite());
        if !finite || !size.width().is_finite() || !size.height().is_finite() {
            return Err(FlowgraphError::Layout(
                "layered layout produced non-finite coordinates".to_string(),
            ));
        }

        Ok(Placement { positions, size })
    }

    /// The edge list with a feedback arc set reversed, so that every edge
    /// points from an earlier rank to a later one.
    fn acyclic_edges(&self) -> Vec<(usize, usize)> {
        let mut graph = DiGraph::<(), ()>::with_capacity(self.sizes.len(), self.edges.len());
        for _ in 0..self.sizes.len() {
            graph.add_node(());
        }
        for &(source, target) in &self.edges {
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        }

        let reversed: HashSet<_> = greedy_feedback_arc_set(&graph)
            .map(|edge| edge.id())
            .collect();
        if !reversed.is_empty() {
            debug!(reversed = reversed.len(); "Breaking cycles");
        }

        let mut edges = Vec::with_capacity(self.edges.len());
        let mut seen = HashSet::with_capacity(self.edges.len());
        for edge in graph.edge_references() {
            let (source, target) = (edge.source().index(), edge.target().index());
            let pair = if reversed.contains(&edge.id()) {
                (target, source)
            } else {
                (source, target)
            };
            if seen.insert(pair) {
                edges.push(pair);
            }
        }
        edges
    }

    /// Ranked components in a deterministic order: connected components by
    /// their smallest item, then every unconnected item on its own.
    fn components(
        &self,
        edges: &[(usize, usize)],
        sizes: &[Size],
        spacing: &SpacingConfig,
    ) -> Vec<Component> {
        let mut connected: Vec<usize> = edges.iter().flat_map(|&(s, t)| [s, t]).collect();
        connected.sort_unstable();
        connected.dedup();

        let mut components = if edges.is_empty() {
            Vec::new()
        } else {
            match sugiyama_components(&connected, edges, sizes, spacing) {
                Ok(components) => components,
                Err(err) => {
                    warn!(err:%; "Falling back to longest-path layering");
                    vec![longest_path_component(&connected, edges, sizes, spacing)]
                }
            }
        };
        components.sort_by_key(|component| {
            component
                .iter()
                .flat_map(|rank| rank.iter().map(|&(item, _)| item))
                .min()
                .unwrap_or(usize::MAX)
        });

        let connected: HashSet<usize> = connected.into_iter().collect();
        components.extend(
            (0..sizes.len())
                .filter(|item| !connected.contains(item))
                .map(|item| vec![vec![(item, 0.0)]]),
        );
        components
    }
}

/// Rank and order the connected items with `rust-sugiyama`.
fn sugiyama_components(
    connected: &[usize],
    edges: &[(usize, usize)],
    sizes: &[Size],
    spacing: &SpacingConfig,
) -> Result<Vec<Component>, FlowgraphError> {
    // rust-sugiyama expects dense ids
    let compact: HashMap<usize, u32> = connected
        .iter()
        .enumerate()
        .map(|(id, &item)| (item, id as u32))
        .collect();
    let sugiyama_edges: Vec<(u32, u32)> = edges
        .iter()
        .map(|(s, t)| (compact[s], compact[t]))
        .collect();

    let avg_size = connected
        .iter()
        .map(|&item| (sizes[item].width() + sizes[item].height()) / 2.0)
        .sum::<f32>()
        / connected.len() as f32;
    let vertex_spacing = f64::from((avg_size / 50.0).clamp(2.0, 5.0));

    debug!(
        nodes = connected.len(),
        edges = sugiyama_edges.len();
        "Applying Sugiyama algorithm"
    );

    let layouts = panic::catch_unwind(move || {
        let config = Config {
            minimum_length: 1,
            vertex_spacing,
            ..Default::default()
        };
        rust_sugiyama::from_edges(&sugiyama_edges, &config)
    })
    .map_err(|err| {
        let message = if let Some(msg) = err.downcast_ref::<String>() {
            msg.clone()
        } else if let Some(msg) = err.downcast_ref::<&str>() {
            (*msg).to_string()
        } else {
            "unknown panic".to_string()
        };
        FlowgraphError::Layout(format!("rust-sugiyama panicked: {message}"))
    })?;

    let max_width = connected
        .iter()
        .map(|&item| sizes[item].width())
        .fold(0.0_f32, f32::max);
    let unit = (max_width + spacing.node_separation()) / vertex_spacing as f32;

    let mut seen = HashSet::new();
    let mut components = Vec::with_capacity(layouts.len());
    for (coords, _, _) in &layouts {
        let mut placed: Vec<(usize, f64, f64)> = Vec::with_capacity(coords.len());
        for &(id, (x, y)) in coords {
            // Dummy vertices, if reported, fall outside the dense range.
            let Some(&item) = connected.get(id) else {
                continue;
            };
            if !x.is_finite() || !y.is_finite() {
                return Err(FlowgraphError::Layout(format!(
                    "rust-sugiyama returned a non-finite coordinate for item {item}"
                )));
            }
            if seen.insert(item) {
                placed.push((item, x, y));
            }
        }
        if !placed.is_empty() {
            components.push(ranks_from_coordinates(placed, edges, unit));
        }
    }

    if seen.len() != connected.len() {
        return Err(FlowgraphError::Layout(format!(
            "rust-sugiyama placed {} of {} items",
            seen.len(),
            connected.len()
        )));
    }
    Ok(components)
}

/// Group items into ranks by their y coordinate and order each rank by x.
///
/// The rank axis is flipped when most edges would otherwise point upward,
/// so the result does not depend on the sign convention of the engine.
fn ranks_from_coordinates(
    mut placed: Vec<(usize, f64, f64)>,
    edges: &[(usize, usize)],
    unit: f32,
) -> Component {
    placed.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.1.total_cmp(&b.1)).then(a.0.cmp(&b.0)));

    let mut rank_of = HashMap::new();
    let mut ranks: Vec<Vec<(usize, f64)>> = Vec::new();
    let mut last_y: Option<f64> = None;
    for (item, x, y) in placed {
        let new_rank = last_y.is_none_or(|last| (y - last).abs() > 1e-6);
        if new_rank {
            ranks.push(Vec::new());
            last_y = Some(y);
        }
        rank_of.insert(item, ranks.len() - 1);
        if let Some(rank) = ranks.last_mut() {
            rank.push((item, x));
        }
    }

    let (forward, backward) = edges.iter().fold((0, 0), |(f, b), (s, t)| {
        match (rank_of.get(s), rank_of.get(t)) {
            (Some(rs), Some(rt)) if rs < rt => (f + 1, b),
            (Some(rs), Some(rt)) if rs > rt => (f, b + 1),
            _ => (f, b),
        }
    });
    if backward > forward {
        ranks.reverse();
    }

    let min_x = ranks
        .iter()
        .flatten()
        .map(|&(_, x)| x)
        .fold(f64::INFINITY, f64::min);
    ranks
        .into_iter()
        .map(|rank| {
            rank.into_iter()
                .map(|(item, x)| (item, (x - min_x) as f32 * unit))
                .collect()
        })
        .collect()
}

/// Longest-path layering of all connected items as a single component,
/// ordered by item index inside each rank.
fn longest_path_component(
    connected: &[usize],
    edges: &[(usize, usize)],
    sizes: &[Size],
    spacing: &SpacingConfig,
) -> Component {
    let mut graph = DiGraph::<usize, ()>::new();
    let indices: HashMap<usize, NodeIndex> = connected
        .iter()
        .map(|&item| (item, graph.add_node(item)))
        .collect();
    for (s, t) in edges {
        graph.add_edge(indices[s], indices[t], ());
    }

    let mut level: HashMap<usize, usize> = connected.iter().map(|&item| (item, 0)).collect();
    if let Ok(order) = toposort(&graph, None) {
        for node in order {
            let item = graph[node];
            let next = level[&item] + 1;
            for target in graph.neighbors(node) {
                let entry = level.entry(graph[target]).or_insert(0);
                *entry = (*entry).max(next);
            }
        }
    }

    let depth = level.values().copied().max().unwrap_or(0);
    let mut ranks: Vec<Vec<usize>> = vec![Vec::new(); depth + 1];
    for &item in connected {
        ranks[level[&item]].push(item);
    }

    let unit = connected
        .iter()
        .map(|&item| sizes[item].width())
        .fold(0.0_f32, f32::max)
        + spacing.node_separation();
    ranks
        .into_iter()
        .filter(|rank| !rank.is_empty())
        .map(|rank| {
            let center = (rank.len() as f32 - 1.0) / 2.0;
            rank.into_iter()
                .enumerate()
                .map(|(pos, item)| (item, (pos as f32 - center) * unit))
                .collect()
        })
        .collect()
}

/// Assign top-left corners to one component starting at `offset_x`.
///
/// Each rank is as tall as its tallest item and items are vertically
/// centered in it. Within a rank, items keep their desired x unless that
/// would bring them closer than the node separation to their left neighbor.
fn place_component(
    component: &[Rank],
    sizes: &[Size],
    spacing: &SpacingConfig,
    offset_x: f32,
    positions: &mut [Point],
) -> Size {
    let mut centers = Vec::new();
    let mut top = 0.0_f32;
    let mut bottom = 0.0_f32;
    for rank in component {
        let rank_height = rank
            .iter()
            .map(|&(item, _)| sizes[item].height())
            .fold(0.0_f32, f32::max);

        let mut right_edge: Option<f32> = None;
        for &(item, desired_x) in rank {
            let half_width = sizes[item].width() / 2.0;
            let x = match right_edge {
                Some(right) => desired_x.max(right + spacing.node_separation() + half_width),
                None => desired_x,
            };
            right_edge = Some(x + half_width);
            centers.push((item, x, top + rank_height / 2.0));
        }

        bottom = top + rank_height;
        top = bottom + spacing.rank_separation();
    }

    let min_x = centers
        .iter()
        .map(|&(item, x, _)| x - sizes[item].width() / 2.0)
        .fold(f32::INFINITY, f32::min);
    let max_x = centers
        .iter()
        .map(|&(item, x, _)| x + sizes[item].width() / 2.0)
        .fold(f32::NEG_INFINITY, f32::max);

    for (item, x, y) in centers {
        let size = sizes[item];
        positions[item] = Point::new(
            x - size.width() / 2.0 - min_x + offset_x,
            y - size.height() / 2.0,
        );
    }

    if max_x.is_finite() && min_x.is_finite() {
        Size::new(max_x - min_x, bottom)
    } else {
        Size::default()
    }
}

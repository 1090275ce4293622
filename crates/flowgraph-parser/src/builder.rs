//! Assembly of the semantic [`Diagram`] from parsed statements.
//!
//! Groups live in a flat list in the order they are opened; a stack of
//! indices into that list tracks the current nesting. Nodes are kept in an
//! insertion-ordered map so the output follows discovery order.

use indexmap::IndexMap;
use log::{debug, trace};

use flowgraph_core::semantic::{Diagram, DiagramEdge, DiagramNode, Direction, Group, ShapeKind};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    label::slugify,
    parser_types::{Chain, NodeRef, Statement, SubgraphHeader},
    span::Span,
};

#[derive(Debug)]
struct NodeEntry {
    label: String,
    shape: ShapeKind,
    group: Option<usize>,
    /// False while the node has only been seen as a bare reference.
    explicit: bool,
}

#[derive(Debug)]
struct GroupEntry {
    id: String,
    title: String,
    members: Vec<String>,
    parent: Option<usize>,
    direction: Option<Direction>,
    span: Span,
}

/// Incrementally builds a [`Diagram`] while collecting diagnostics.
#[derive(Debug)]
pub(crate) struct DiagramBuilder {
    direction: Direction,
    nodes: IndexMap<String, NodeEntry>,
    edges: Vec<DiagramEdge>,
    groups: Vec<GroupEntry>,
    group_ids: IndexMap<String, usize>,
    stack: Vec<usize>,
    diagnostics: DiagnosticCollector,
}

impl DiagramBuilder {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            nodes: IndexMap::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            group_ids: IndexMap::new(),
            stack: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Apply one parsed statement located at `span`.
    pub fn apply(&mut self, statement: Statement, span: Span) {
        match statement {
            Statement::Subgraph(header) => self.open_group(header, span),
            Statement::End => self.close_group(span),
            Statement::Direction(direction) => self.set_direction(direction),
            Statement::Unsupported(keyword) => {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("`{keyword}` statement ignored"))
                        .with_code(ErrorCode::W101)
                        .with_span(span),
                );
            }
            Statement::Chain(chain) => self.add_chain(chain),
            Statement::Nodes(nodes) => {
                for node in nodes {
                    self.resolve_node(node);
                }
            }
        }
    }

    /// Record a statement that matched no rule.
    pub fn reject(&mut self, text: &str, span: Span, expected: Option<&str>) {
        let mut diagnostic = Diagnostic::warning(format!("unrecognized statement `{text}`"))
            .with_code(ErrorCode::W100)
            .with_span(span);
        if let Some(expected) = expected {
            diagnostic = diagnostic.with_help(format!("expected {expected}"));
        }
        self.diagnostics.emit(diagnostic);
    }

    fn set_direction(&mut self, direction: Direction) {
        match self.stack.last() {
            Some(&idx) => self.groups[idx].direction = Some(direction),
            None => self.direction = direction,
        }
    }

    fn open_group(&mut self, header: SubgraphHeader, span: Span) {
        let title = header
            .title
            .clone()
            .or_else(|| header.id.clone())
            .unwrap_or_default();
        let requested = header.id.unwrap_or_else(|| slugify(&title));
        let id = self.unique_group_id(&requested, span);

        let idx = self.groups.len();
        debug!(group = id.as_str(), depth = self.stack.len(); "Opening group");
        self.groups.push(GroupEntry {
            id: id.clone(),
            title,
            members: Vec::new(),
            parent: self.stack.last().copied(),
            direction: None,
            span,
        });
        self.group_ids.insert(id, idx);
        self.stack.push(idx);
    }

    /// Group ids share one namespace with node ids; collisions get a
    /// numeric suffix.
    fn unique_group_id(&mut self, requested: &str, span: Span) -> String {
        let taken = |id: &str| self.group_ids.contains_key(id) || self.nodes.contains_key(id);
        if !taken(requested) {
            return requested.to_string();
        }

        let id = (2..)
            .map(|n| format!("{requested}_{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| requested.to_string());
        self.diagnostics.emit(
            Diagnostic::warning(format!("group id `{requested}` is already in use"))
                .with_code(ErrorCode::W202)
                .with_span(span)
                .with_help(format!("the group was renamed to `{id}`")),
        );
        id
    }

    fn close_group(&mut self, span: Span) {
        if self.stack.pop().is_none() {
            self.diagnostics.emit(
                Diagnostic::warning("`end` without an open subgraph")
                    .with_code(ErrorCode::W200)
                    .with_span(span),
            );
        }
    }

    fn add_chain(&mut self, chain: Chain) {
        let mut sources: Vec<String> = chain
            .head
            .into_iter()
            .map(|node| self.resolve_node(node))
            .collect();

        for (link, targets) in chain.links {
            let targets: Vec<String> = targets
                .into_iter()
                .map(|node| self.resolve_node(node))
                .collect();
            for source in &sources {
                for target in &targets {
                    trace!(source, target, edge_type:% = link.edge_type; "Adding edge");
                    self.edges.push(DiagramEdge::new(
                        source.clone(),
                        target.clone(),
                        link.label.clone(),
                        link.edge_type,
                    ));
                }
            }
            sources = targets;
        }
    }

    /// Declare or reference a node and return the id an edge should use.
    ///
    /// An id naming an existing group refers to that group and creates no
    /// node.
    fn resolve_node(&mut self, node: NodeRef) -> String {
        let current_group = self.stack.last().copied();

        if let Some(entry) = self.nodes.get_mut(&node.id) {
            if let Some(shape) = node.shape {
                if !entry.explicit {
                    entry.label = shape.label;
                    entry.shape = shape.kind;
                    entry.explicit = true;
                } else if entry.label != shape.label || entry.shape != shape.kind {
                    self.diagnostics.emit(
                        Diagnostic::note(format!(
                            "node `{}` redefined; the first definition is kept",
                            node.id
                        ))
                        .with_code(ErrorCode::N300)
                        .with_span(node.span),
                    );
                }
            }
            if entry.group.is_none() {
                if let Some(idx) = current_group {
                    entry.group = Some(idx);
                    self.groups[idx].members.push(node.id.clone());
                }
            }
            return node.id;
        }

        if self.group_ids.contains_key(&node.id) {
            return node.id;
        }

        let (label, shape, explicit) = match node.shape {
            Some(shape) => (shape.label, shape.kind, true),
            None => (node.id.clone(), ShapeKind::default(), false),
        };
        if let Some(idx) = current_group {
            self.groups[idx].members.push(node.id.clone());
        }
        self.nodes.insert(
            node.id.clone(),
            NodeEntry {
                label,
                shape,
                group: current_group,
                explicit,
            },
        );
        node.id
    }

    /// Close any groups still open and produce the diagram.
    pub fn finish(mut self) -> (Diagram, Vec<Diagnostic>) {
        while let Some(idx) = self.stack.pop() {
            let group = &self.groups[idx];
            self.diagnostics.emit(
                Diagnostic::warning(format!("subgraph `{}` is never closed", group.id))
                    .with_code(ErrorCode::W201)
                    .with_span(group.span)
                    .with_help("add `end` after the last statement of the subgraph"),
            );
        }

        let group_id = |idx: usize| self.groups[idx].id.clone();

        let nodes = self
            .nodes
            .iter()
            .map(|(id, entry)| {
                let label = if entry.label.is_empty() {
                    id.clone()
                } else {
                    entry.label.clone()
                };
                DiagramNode::new(id.clone(), label, entry.shape, entry.group.map(group_id))
            })
            .collect();

        let groups = self
            .groups
            .iter()
            .map(|group| {
                Group::new(
                    group.id.clone(),
                    group.title.clone(),
                    group.members.clone(),
                    group.parent.map(group_id),
                    group.direction,
                )
            })
            .collect();

        let diagram = Diagram::new(self.direction, nodes, self.edges, groups);
        (diagram, self.diagnostics.finish())
    }
}

//! Flowgraph - turns flowchart text into a laid-out graph.
//!
//! The pipeline is extract → sanitize → parse → layout → compose:
//!
//! 1. Diagram text is pulled out of prose or markdown fences.
//! 2. Labels full of punctuation are quoted and only the first diagram is kept.
//! 3. The text is parsed into a [`semantic::Diagram`] of nodes, edges and
//!    nested groups.
//! 4. Each group is laid out on its own, innermost first, then top-level
//!    boxes are laid out as a meta-graph.
//! 5. The result is composed into a [`render::RenderGraph`] of positioned
//!    nodes and styled edges.
//!
//! [`convert_to_graph`] runs the whole pipeline with default settings.
//! [`GraphBuilder`] exposes each stage and reports errors, and
//! [`stream_parse`] follows diagram text as it arrives in chunks.
//!
//! # Example
//!
//! ```
//! let graph = flowgraph::convert_to_graph("graph LR\nA[Node A] --> B(Node B)");
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.edges().len(), 1);
//! ```

pub mod config;
pub mod layout;

mod compose;
mod error;

pub use flowgraph_core::{color, geometry, render, semantic};
pub use flowgraph_parser::{
    Diagnostic, ErrorCode, Severity, Span, StreamEvent, StreamParser, StreamSession, StreamState,
    extract_diagram_source, sanitize, stream_parse,
};

pub use error::FlowgraphError;

use log::{debug, error, info, trace};

use config::AppConfig;
use layout::DiagramLayout;
use render::RenderGraph;
use semantic::Diagram;

/// Builder for converting flowchart text into a render graph.
///
/// Every call works on fresh values; a builder holds nothing but its
/// configuration and can be reused for any number of conversions.
///
/// # Examples
///
/// ```rust
/// use flowgraph::{GraphBuilder, config::AppConfig};
///
/// let builder = GraphBuilder::new(AppConfig::default());
///
/// // Run the whole pipeline
/// let graph = builder
///     .convert("graph TD\nA --> B")
///     .expect("Failed to convert");
/// assert_eq!(graph.nodes().len(), 2);
///
/// // Or one stage at a time
/// let source = builder.prepare("Here you go:\n```mermaid\ngraph TD\nA --> B\n```");
/// let (diagram, diagnostics) = builder.parse(&source);
/// assert!(diagnostics.is_empty());
/// let layout = builder.layout(&diagram).expect("Failed to lay out");
/// let graph = builder.compose(&diagram, &layout).expect("Failed to compose");
/// assert_eq!(graph.edges().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    config: AppConfig,
}

impl GraphBuilder {
    /// Create a new graph builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this builder runs with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Extract diagram text from `content` and sanitize it.
    ///
    /// The returned text is what [`parse`](Self::parse) expects, and what the
    /// spans of its diagnostics point into.
    pub fn prepare(&self, content: &str) -> String {
        let source = sanitize(&extract_diagram_source(content));
        trace!(source = source.as_str(); "Prepared diagram source");
        source
    }

    /// Parse prepared source into a semantic diagram.
    ///
    /// Parsing never fails: statements that cannot be understood are
    /// skipped and returned as warnings.
    pub fn parse(&self, source: &str) -> (Diagram, Vec<Diagnostic>) {
        let (diagram, diagnostics) = flowgraph_parser::parse_with_diagnostics(source);
        debug!(warnings = diagnostics.len(); "Diagram parsed");
        (diagram, diagnostics)
    }

    /// Lay out a parsed diagram.
    ///
    /// # Errors
    ///
    /// Returns [`FlowgraphError::Config`] if the configuration is invalid
    /// and [`FlowgraphError::Layout`] if the layered layout fails.
    pub fn layout(&self, diagram: &Diagram) -> Result<DiagramLayout, FlowgraphError> {
        layout::layout_diagram(diagram, self.config.layout())
    }

    /// Compose the render graph from a diagram and its layout.
    ///
    /// # Errors
    ///
    /// Returns [`FlowgraphError::Layout`] if the layout does not cover the
    /// diagram.
    pub fn compose(
        &self,
        diagram: &Diagram,
        layout: &DiagramLayout,
    ) -> Result<RenderGraph, FlowgraphError> {
        compose::compose(diagram, layout, &self.config.style().edge_palette())
    }

    /// Run the whole pipeline on raw content.
    ///
    /// # Errors
    ///
    /// Returns [`FlowgraphError`] if the configuration is invalid or the
    /// layout or composition fails.
    pub fn convert(&self, content: &str) -> Result<RenderGraph, FlowgraphError> {
        let source = self.prepare(content);
        let (diagram, diagnostics) = self.parse(&source);
        for diagnostic in &diagnostics {
            debug!(diagnostic:%; "Skipped statement");
        }

        let layout = self.layout(&diagram)?;
        let graph = self.compose(&diagram, &layout)?;
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len();
            "Graph converted"
        );
        Ok(graph)
    }
}

/// Convert raw content into a render graph with the default configuration.
///
/// Never fails: if layout goes wrong the error is logged and an empty graph
/// is returned.
pub fn convert_to_graph(content: &str) -> RenderGraph {
    GraphBuilder::default()
        .convert(content)
        .unwrap_or_else(|err| {
            error!(err:%; "Conversion failed, returning an empty graph");
            RenderGraph::default()
        })
}

//! # Flowgraph Parser
//!
//! Text front end of Flowgraph: turns loosely formatted flowchart text into
//! the semantic [`Diagram`] model.
//!
//! The crate provides four independent pieces:
//!
//! - [`extract_diagram_source`] pulls diagram text out of prose or markdown.
//! - [`sanitize`] quotes punctuation-heavy labels and keeps a single diagram.
//! - [`StreamParser`] / [`stream_parse`] detect diagram text in a chunked
//!   stream.
//! - [`parse`] / [`parse_with_diagnostics`] build the semantic model.
//!
//! Parsing never fails. Statements that cannot be understood are skipped and
//! reported as [`Diagnostic`]s.
//!
//! ## Usage
//!
//! ```
//! use flowgraph_parser::parse;
//!
//! let diagram = parse("graph LR\nA[Node A] --> B(Node B)");
//! assert_eq!(diagram.nodes().len(), 2);
//! assert_eq!(diagram.edges().len(), 1);
//! ```

mod builder;
pub mod error;
mod fence;
pub mod keywords;
mod label;
mod parser;
mod parser_types;
mod sanitize;
mod source;
mod span;
mod stream;

pub use error::{Diagnostic, ErrorCode, Severity};
pub use fence::extract_diagram_source;
pub use label::{SHAPE_DELIMITERS, classify_shape};
pub use sanitize::sanitize;
pub use span::Span;
pub use stream::{SCAN_WINDOW, StreamEvent, StreamParser, StreamSession, StreamState, stream_parse};

use log::{debug, info};

use flowgraph_core::semantic::{Diagram, Direction};

use builder::DiagramBuilder;

/// Parse diagram text into the semantic model.
///
/// Equivalent to [`parse_with_diagnostics`] with the diagnostics dropped.
pub fn parse(source: &str) -> Diagram {
    parse_with_diagnostics(source).0
}

/// Parse diagram text and return the diagnostics recorded along the way.
///
/// 1. Comment and blank lines are dropped and the text is split into
///    statements.
/// 2. The first statement is the header (`graph TD`, `flowchart LR`). It is
///    never parsed as a node, but its direction is honored.
/// 3. Every other statement is parsed and applied in order. Statements that
///    match nothing produce a warning and are skipped.
///
/// # Example
///
/// ```
/// use flowgraph_parser::{ErrorCode, parse_with_diagnostics};
///
/// let (diagram, diagnostics) = parse_with_diagnostics("graph TD\nA --> B\n???");
/// assert_eq!(diagram.edges().len(), 1);
/// assert_eq!(diagnostics[0].code(), Some(ErrorCode::W100));
/// ```
pub fn parse_with_diagnostics(source: &str) -> (Diagram, Vec<Diagnostic>) {
    let statements = source::statements(source);
    let Some((header, body)) = statements.split_first() else {
        debug!("Empty diagram source");
        return (Diagram::default(), Vec::new());
    };

    let direction = parser::header_direction(header.text).unwrap_or(Direction::TopBottom);
    let mut builder = DiagramBuilder::new(direction);

    for statement in body {
        match parser::parse_statement(statement.text, statement.span.start()) {
            Ok(parsed) => builder.apply(parsed, statement.span),
            Err(expected) => builder.reject(statement.text, statement.span, expected),
        }
    }

    let (diagram, diagnostics) = builder.finish();
    info!(
        nodes = diagram.nodes().len(),
        edges = diagram.edges().len(),
        groups = diagram.groups().len(),
        warnings = diagnostics.len();
        "Parsed diagram"
    );
    (diagram, diagnostics)
}

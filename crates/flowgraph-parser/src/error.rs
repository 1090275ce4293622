//! Diagnostics reported while parsing.
//!
//! Parsing is fail-open: malformed statements are skipped rather than
//! aborting the whole document. Each skipped or suspicious construct is
//! recorded as a [`Diagnostic`] so callers can surface it (the CLI renders
//! them with source snippets) without the pipeline ever failing.
//!
//! # Example
//!
//! ```
//! # use flowgraph_parser::error::{Diagnostic, ErrorCode};
//! # use flowgraph_parser::Span;
//! let diag = Diagnostic::warning("unrecognized statement")
//!     .with_code(ErrorCode::W100)
//!     .with_span(Span::new(10..24))
//!     .with_help("expected a node declaration, an edge, `subgraph` or `end`");
//!
//! assert!(diag.severity().is_warning());
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use severity::Severity;

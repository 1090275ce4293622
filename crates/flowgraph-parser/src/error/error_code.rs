//! Codes for parser diagnostics.
//!
//! - `W1xx` - statements that were skipped
//! - `W2xx` - structural problems with groups
//! - `N3xx` - notes about merged definitions

use std::fmt;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unrecognized statement.
    ///
    /// The line matched none of the edge, node, or group patterns and was skipped.
    W100,

    /// Unsupported statement.
    ///
    /// Styling and interaction statements (`style`, `classDef`, `class`,
    /// `click`, `linkStyle`) are recognized but have no effect on the graph.
    W101,

    /// Unmatched `end`.
    ///
    /// An `end` keyword appeared with no open group.
    W200,

    /// Unterminated group.
    ///
    /// A group was still open at the end of input and was closed implicitly.
    W201,

    /// Group id collision.
    ///
    /// A group was declared with an id already taken by a node or another
    /// group and received a disambiguated id.
    W202,

    /// Conflicting redefinition.
    ///
    /// A node was defined again with a different shape or label; the first
    /// definition is kept.
    N300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "W100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W100 => "W100",
            ErrorCode::W101 => "W101",
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::N300 => "N300",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::W100 => "unrecognized statement",
            ErrorCode::W101 => "unsupported statement",
            ErrorCode::W200 => "unmatched end",
            ErrorCode::W201 => "unterminated group",
            ErrorCode::W202 => "group id collision",
            ErrorCode::N300 => "conflicting redefinition",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

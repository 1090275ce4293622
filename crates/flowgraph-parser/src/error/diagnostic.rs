//! The core diagnostic type.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode},
    span::Span,
};

/// A diagnostic message with an optional source location.
///
/// ```text
/// warning[W100]: unrecognized statement
///   |
/// 3 | A -> B
///   | ^^^^^^ skipped
///   |
///   = help: edges use connectors such as `-->`, `---`, `-.->` or `==>`
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    span: Option<Span>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create a note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source location, if any.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a source location.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            span: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::warning("unmatched end")
            .with_code(ErrorCode::W200)
            .with_span(Span::new(5..8))
            .with_help("remove the extra `end`");

        assert_eq!(diag.severity(), Severity::Warning);
        assert_eq!(diag.code(), Some(ErrorCode::W200));
        assert_eq!(diag.span(), Some(Span::new(5..8)));
        assert_eq!(diag.help(), Some("remove the extra `end`"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("unrecognized statement").with_code(ErrorCode::W100);
        assert_eq!(diag.to_string(), "warning[W100]: unrecognized statement");
        assert_eq!(Diagnostic::note("kept first").to_string(), "note: kept first");
    }
}

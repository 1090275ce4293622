//! Collector for accumulating diagnostics during a parse.

use log::{debug, warn};

use crate::error::Diagnostic;

/// Accumulates diagnostics so that the parser can keep going after a bad
/// statement instead of failing on the first one.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the log.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_warning() {
            warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        } else {
            debug!(code:? = diagnostic.code(); "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection and return everything that was recorded.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

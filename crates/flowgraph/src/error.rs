//! Error types for Flowgraph operations.
//!
//! Parsing never fails, so [`FlowgraphError`] only covers the stages that
//! can: reading input, running the layout engine and loading configuration.

use std::io;

use thiserror::Error;

/// The main error type for Flowgraph operations.
#[derive(Debug, Error)]
pub enum FlowgraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Config error: {0}")]
    Config(String),
}

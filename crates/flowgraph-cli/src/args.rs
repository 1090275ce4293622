//! Command-line argument definitions for the Flowgraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, streaming simulation and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Flowgraph tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input file, or `-` for stdin
    #[arg(help = "Path to the input file (prose, markdown or bare diagram text), `-` for stdin")]
    pub input: String,

    /// Path to the output JSON file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write the extracted and sanitized diagram text instead of the graph
    #[arg(long)]
    pub extract: bool,

    /// Feed the input through the streaming parser in chunks of this many bytes
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u32).range(1..))]
    pub stream_chunk: Option<u32>,
}

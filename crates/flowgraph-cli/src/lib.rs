//! CLI logic for the Flowgraph tool.
//!
//! Reads prose, markdown or bare diagram text, turns it into a laid-out
//! render graph and writes the graph as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Read, Write},
};

use log::{debug, info, warn};

use flowgraph::{Diagnostic, FlowgraphError, GraphBuilder};
use flowgraph_parser::{StreamEvent, StreamParser};

/// What a successful run saw, for reporting parser warnings.
#[derive(Debug)]
pub struct RunSummary {
    source: String,
    diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    /// The sanitized diagram text that was parsed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Non-fatal diagnostics collected while parsing [`Self::source`].
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Run the Flowgraph CLI application
///
/// # Errors
///
/// Returns `FlowgraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Layout errors
pub fn run(args: &Args) -> Result<RunSummary, FlowgraphError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let content = read_input(&args.input)?;

    let content = match args.stream_chunk {
        Some(chunk_size) => stream_extract(&content, chunk_size as usize),
        None => content,
    };

    let builder = GraphBuilder::new(app_config);
    let source = builder.prepare(&content);
    let (diagram, diagnostics) = builder.parse(&source);
    debug!(
        nodes = diagram.nodes().len(),
        edges = diagram.edges().len(),
        groups = diagram.groups().len(),
        warnings = diagnostics.len();
        "Diagram parsed"
    );

    let output = if args.extract {
        source.clone()
    } else {
        let layout = builder.layout(&diagram)?;
        let graph = builder.compose(&diagram, &layout)?;
        serde_json::to_string_pretty(&graph)
            .map_err(|err| FlowgraphError::Io(io::Error::other(err)))?
    };

    write_output(args.output.as_deref(), &output)?;
    info!(output_path:? = args.output; "Output written successfully");

    Ok(RunSummary {
        source,
        diagnostics,
    })
}

fn read_input(input: &str) -> Result<String, FlowgraphError> {
    if input == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), FlowgraphError> {
    match output {
        Some(path) => fs::write(path, content)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Replay `content` through the streaming extractor in chunks of roughly
/// `chunk_size` bytes, as a chat client receiving tokens would.
///
/// Chunks never split a UTF-8 character. Returns the extracted diagram text,
/// which is empty when the stream never saw a diagram.
fn stream_extract(content: &str, chunk_size: usize) -> String {
    let mut parser = StreamParser::new();
    let mut partials = 0usize;
    let mut done = None;

    let mut handle = |events: Vec<StreamEvent>| {
        for event in events {
            match event {
                StreamEvent::Partial(_) => partials += 1,
                StreamEvent::Done(text) => done = Some(text),
            }
        }
    };

    let mut rest = content;
    while !rest.is_empty() {
        let mut split = chunk_size.min(rest.len());
        while !rest.is_char_boundary(split) {
            split += 1;
        }
        let (chunk, tail) = rest.split_at(split);
        handle(parser.append(chunk));
        rest = tail;
    }
    handle(parser.finish());

    debug!(partials, chunk_size; "Streaming extraction finished");
    let text = done.unwrap_or_default();
    if text.is_empty() {
        warn!("Stream produced no diagram text");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_extract_fenced_answer() {
        let content = "Here you go:\n```mermaid\ngraph LR\nA-->B\n```\nThanks!";
        for chunk_size in [1, 3, 7, 64] {
            assert_eq!(stream_extract(content, chunk_size), "graph LR\nA-->B");
        }
    }

    #[test]
    fn test_stream_extract_multibyte_chunks() {
        let content = "graph TD\nA[Grüße]-->B[日本]";
        assert_eq!(stream_extract(content, 1), content);
    }

    #[test]
    fn test_stream_extract_without_diagram() {
        assert_eq!(stream_extract("just some prose", 4), "");
    }
}

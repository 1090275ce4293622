//! Extraction of diagram source from surrounding prose and markdown fences.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::keywords::{first_keyword, starts_with_keyword};

/// Fence marker used by markdown code blocks.
pub const FENCE: &str = "```";

/// Opening fence explicitly tagged with the diagram language.
pub const DIAGRAM_FENCE: &str = "```mermaid";

fn tagged_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```mermaid[ \t]*\r?\n(.*?)```").expect("valid regex"))
}

fn generic_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[\w-]*[ \t]*\r?\n(.*?)```").expect("valid regex"))
}

/// Pull diagram source out of free-form content.
///
/// Strategies, in order:
/// 1. a fenced block tagged `mermaid`;
/// 2. any fenced block whose body starts with a diagram keyword;
/// 3. the first diagram keyword in the raw text, up to the next fence
///    marker or the end of the string.
///
/// Falls back to the trimmed input when nothing matches.
///
/// # Examples
///
/// ```
/// use flowgraph_parser::extract_diagram_source;
///
/// let content = "Here you go:\n```mermaid\ngraph TD\nA-->B\n```\nEnjoy!";
/// assert_eq!(extract_diagram_source(content), "graph TD\nA-->B");
/// ```
pub fn extract_diagram_source(content: &str) -> String {
    if let Some(body) = tagged_fence_regex()
        .captures(content)
        .and_then(|caps| caps.get(1))
    {
        debug!("Extracted diagram from tagged fence");
        return body.as_str().trim().to_string();
    }

    if let Some(body) = generic_fence_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .find(|body| starts_with_keyword(body.as_str()))
    {
        debug!("Extracted diagram from generic fence");
        return body.as_str().trim().to_string();
    }

    if let Some(start) = first_keyword(content) {
        let rest = &content[start..];
        let end = rest.find(FENCE).unwrap_or(rest.len());
        debug!(offset = start; "Extracted diagram from raw text");
        return rest[..end].trim().to_string();
    }

    content.trim().to_string()
}

//! Diagram-start keywords shared by the sanitizer, the fence extractor and
//! the streaming detector.

use std::{ops::Range, sync::OnceLock};

use regex::Regex;

/// Keywords that open a diagram block.
pub const DIAGRAM_KEYWORDS: [&str; 12] = [
    "graph",
    "flowchart",
    "sequenceDiagram",
    "stateDiagram",
    "classDiagram",
    "gantt",
    "journey",
    "erDiagram",
    "gitGraph",
    "pie",
    "timeline",
    "infoDiagram",
];

/// Matches a keyword at the start of a line (after optional indentation),
/// followed by a word boundary. A version suffix such as the `-v2` of
/// `stateDiagram-v2` belongs to the match.
fn keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternatives = DIAGRAM_KEYWORDS.join("|");
        Regex::new(&format!(r"(?m)^[ \t]*({alternatives})\b(?:-v\d+\b)?")).expect("valid regex")
    })
}

/// Characters that continue a flowchart statement. A keyword followed by one
/// of them is a node id (`pie --> crust`, `graph[Graph]`), not a header.
const STATEMENT_CONTINUATIONS: [char; 11] = ['-', '=', '.', '~', '<', '&', '[', '(', '{', '>', ':'];

/// Byte ranges of the keywords that really open a diagram.
fn keyword_spans(text: &str) -> impl Iterator<Item = Range<usize>> {
    keyword_regex().captures_iter(text).filter_map(move |caps| {
        let keyword = caps.get(1)?;
        let line_end = text[keyword.end()..]
            .find('\n')
            .map_or(text.len(), |offset| keyword.end() + offset);
        let rest = text[caps.get(0)?.end()..line_end].trim_start_matches([' ', '\t']);
        let continues_statement = rest.starts_with(STATEMENT_CONTINUATIONS);
        (!continues_statement).then(|| keyword.range())
    })
}

/// Byte offsets of every keyword occurrence, pointing at the keyword itself
/// (indentation excluded).
pub fn keyword_positions(text: &str) -> Vec<usize> {
    keyword_spans(text).map(|span| span.start).collect()
}

/// Byte offset of the first keyword occurrence.
pub fn first_keyword(text: &str) -> Option<usize> {
    keyword_spans(text).next().map(|span| span.start)
}

/// Byte range of the first keyword itself, without trailing text.
pub fn first_keyword_span(text: &str) -> Option<Range<usize>> {
    keyword_spans(text).next()
}

/// Returns true if `text`, after leading whitespace, starts with a keyword.
pub fn starts_with_keyword(text: &str) -> bool {
    let trimmed = text.trim_start();
    first_keyword(trimmed) == Some(0)
}

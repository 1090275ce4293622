//! Label sanitizer.
//!
//! Normalizes raw diagram source so the statement grammar only ever sees
//! punctuation-heavy labels in quoted form, and collapses input holding
//! several diagrams down to the first one. Every rule is fail-open: a
//! region that does not match cleanly is copied through unchanged.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::keywords::keyword_positions;

/// Characters that force a label or subgraph title into quoted form.
const SPECIAL_CHARS: [char; 8] = ['(', ')', '"', '[', ']', ',', ':', ';'];

/// Sanitize raw diagram text.
///
/// 1. Unquoted `id[label]` labels containing any of `()"[],:;` become
///    `id["label"]` with `\` and `"` escaped.
/// 2. `subgraph <name>` lines whose unquoted name contains the same
///    punctuation get the name quoted; a trailing `|...|` annotation is kept.
/// 3. When several diagram-start keywords appear, only the span from the
///    first up to the second survives.
///
/// The result is trimmed. Applying `sanitize` twice yields the same text as
/// applying it once.
///
/// # Examples
///
/// ```
/// use flowgraph_parser::sanitize;
///
/// let clean = sanitize("graph TD\nD[CDN (CloudFront)]");
/// assert!(clean.contains(r#"D["CDN (CloudFront)"]"#));
/// ```
pub fn sanitize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let quoted = quote_bracket_labels(trimmed);
    let titled = quote_subgraph_titles(&quoted);
    let single = first_diagram(&titled);

    single.trim().to_string()
}

fn needs_quoting(text: &str) -> bool {
    text.contains(SPECIAL_CHARS)
}

fn escape_label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Rule 1: quote `id[label]` labels that contain special characters.
///
/// Scans character by character so that brackets inside already-quoted
/// strings are never touched.
fn quote_bracket_labels(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 16);
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut cursor = 0;

    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            prev = Some(c);
            continue;
        }

        if c == '"' {
            in_quotes = true;
            prev = Some(c);
            continue;
        }

        let opens_label = c == '['
            && prev.is_some_and(is_identifier_char)
            && chars
                .peek()
                .is_some_and(|&(_, next)| !matches!(next, '"' | '[' | '(' | '/' | '\\'));

        if opens_label {
            let body_start = idx + c.len_utf8();
            if let Some(body_len) = matching_bracket(&text[body_start..]) {
                let body = &text[body_start..body_start + body_len];
                if needs_quoting(body) {
                    output.push_str(&text[cursor..idx]);
                    output.push_str("[\"");
                    output.push_str(&escape_label(body));
                    output.push_str("\"]");

                    let close = body_start + body_len;
                    cursor = close + 1;
                    while chars.peek().is_some_and(|&(next_idx, _)| next_idx <= close) {
                        chars.next();
                    }
                    prev = Some(']');
                    continue;
                }
            }
        }

        prev = Some(c);
    }

    output.push_str(&text[cursor..]);
    output
}

/// Length of the label body up to the bracket that closes the one already
/// consumed, or `None` if the line ends first.
fn matching_bracket(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, c) in rest.char_indices() {
        match c {
            '\n' => return None,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn subgraph_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*subgraph\s+)(.*?)\s*$").expect("valid regex"))
}

fn trailing_annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*(\|[^|]*\|)$").expect("valid regex"))
}

/// Rule 2: quote subgraph titles that contain special characters.
fn quote_subgraph_titles(text: &str) -> String {
    text.split('\n')
        .map(|line| quote_subgraph_title(line).unwrap_or_else(|| line.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote_subgraph_title(line: &str) -> Option<String> {
    let caps = subgraph_line_regex().captures(line.trim_end_matches('\r'))?;
    let prefix = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str();

    if name.is_empty() || name.starts_with('"') || name.contains('[') {
        return None;
    }

    let (title, annotation) = match trailing_annotation_regex().captures(name) {
        Some(parts) => (
            parts.get(1).map_or("", |m| m.as_str()),
            parts.get(2).map(|m| m.as_str()),
        ),
        None => (name, None),
    };

    if title.is_empty() || title.starts_with('"') || !needs_quoting(title) {
        return None;
    }

    debug!(title; "Quoting subgraph title");
    let mut rewritten = format!("{prefix}\"{}\"", escape_label(title));
    if let Some(annotation) = annotation {
        rewritten.push(' ');
        rewritten.push_str(annotation);
    }
    Some(rewritten)
}

/// Rule 3: keep only the first diagram when several are concatenated.
fn first_diagram(text: &str) -> &str {
    let positions = keyword_positions(text);
    match positions.as_slice() {
        [first, second, ..] => {
            debug!(diagrams = positions.len(); "Truncating input to the first diagram");
            &text[*first..*second]
        }
        _ => text,
    }
}

//! Splitting of diagram text into statements.
//!
//! Comment lines (`%%`) and blank lines are dropped. Physical lines are
//! joined while a double quote is still open so that a quoted label may span
//! several lines, and `;` separates statements outside quotes and brackets.
//! Each statement keeps the byte span it occupies in the original text.

use crate::span::Span;

/// Line prefix introducing a comment.
pub const COMMENT_PREFIX: &str = "%%";

/// A single statement borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceStatement<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// Split `text` into trimmed, non-empty statements in source order.
pub(crate) fn statements(text: &str) -> Vec<SourceStatement<'_>> {
    let lines = physical_lines(text);
    let mut statements = Vec::new();

    let mut idx = 0;
    while idx < lines.len() {
        let (start, end) = lines[idx];
        let line = &text[start..end];
        if is_skippable(line) {
            idx += 1;
            continue;
        }

        let mut last = idx;
        if has_open_quote(line) {
            if let Some(closing) = find_closing_line(text, &lines, idx) {
                last = closing;
            }
        }

        let logical_end = lines[last].1;
        split_statements(text, start, logical_end, &mut statements);
        idx = last + 1;
    }

    statements
}

/// Byte ranges of every line, line terminators excluded.
fn physical_lines(text: &str) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        lines.push((start, start + content.len()));
        start += line.len();
    }
    lines
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX)
}

/// Index of the line on which the quote left open by line `first` closes.
/// `None` if the quote is never closed, in which case the line stands alone.
fn find_closing_line(text: &str, lines: &[(usize, usize)], first: usize) -> Option<usize> {
    let start = lines[first].0;
    (first + 1..lines.len()).find(|&candidate| !has_open_quote(&text[start..lines[candidate].1]))
}

/// Returns true if `text` ends inside a double-quoted string.
fn has_open_quote(text: &str) -> bool {
    let mut in_quotes = false;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' && in_quotes {
            escaped = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        }
    }
    in_quotes
}

/// Split `text[start..end]` on `;` outside quotes and brackets.
fn split_statements<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    out: &mut Vec<SourceStatement<'a>>,
) {
    let logical = &text[start..end];
    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut piece_start = 0;

    for (idx, c) in logical.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                push_trimmed(text, start + piece_start, start + idx, out);
                piece_start = idx + 1;
            }
            _ => {}
        }
    }
    push_trimmed(text, start + piece_start, end, out);
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<SourceStatement<'a>>) {
    let raw = &text[start..end];
    let trimmed_start = raw.trim_start();
    let leading = raw.len() - trimmed_start.len();
    let trimmed = trimmed_start.trim_end();
    if trimmed.is_empty() {
        return;
    }
    let begin = start + leading;
    out.push(SourceStatement {
        text: trimmed,
        span: Span::new(begin..begin + trimmed.len()),
    });
}

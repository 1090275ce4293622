//! Shape classification and label text normalization.

use std::sync::OnceLock;

use regex::Regex;

use flowgraph_core::semantic::ShapeKind;

/// Delimiter pairs recognized around a node label, in match priority order.
///
/// Longer openers precede their prefixes so that `((x))` is never read as
/// `(` + `(x)` + `)`.
pub const SHAPE_DELIMITERS: [(&str, &str, ShapeKind); 10] = [
    ("(((", ")))", ShapeKind::Circle),
    ("((", "))", ShapeKind::Circle),
    ("([", "])", ShapeKind::Stadium),
    ("[[", "]]", ShapeKind::Rectangle),
    ("[(", ")]", ShapeKind::Rectangle),
    ("{{", "}}", ShapeKind::Diamond),
    ("[", "]", ShapeKind::Rectangle),
    (">", "]", ShapeKind::Rectangle),
    ("{", "}", ShapeKind::Diamond),
    ("(", ")", ShapeKind::Rounded),
];

/// Classify a node shape from the delimiters around its label.
///
/// Returns `None` for pairs that are not in [`SHAPE_DELIMITERS`].
///
/// # Examples
///
/// ```
/// use flowgraph_core::semantic::ShapeKind;
/// use flowgraph_parser::classify_shape;
///
/// assert_eq!(classify_shape("{", "}"), Some(ShapeKind::Diamond));
/// assert_eq!(classify_shape("([", "])"), Some(ShapeKind::Stadium));
/// assert_eq!(classify_shape("<", ">"), None);
/// ```
pub fn classify_shape(open: &str, close: &str) -> Option<ShapeKind> {
    SHAPE_DELIMITERS
        .iter()
        .find(|(o, c, _)| *o == open && *c == close)
        .map(|(_, _, shape)| *shape)
}

fn line_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
}

fn html_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid regex"))
}

fn raw_newline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*\r?\n[ \t]*").expect("valid regex"))
}

/// Turn raw label text into display text.
///
/// Quoted labels are unescaped first; inside them both raw line breaks and
/// literal `\n` escapes collapse to a single space. `<br>` tags become line
/// breaks in all labels and any other markup tag is dropped.
pub fn normalize_label(raw: &str, quoted: bool) -> String {
    let text = if quoted {
        let unescaped = unescape_quoted(raw);
        raw_newline_regex().replace_all(&unescaped, " ").into_owned()
    } else {
        raw.to_string()
    };

    let text = line_break_regex().replace_all(&text, "\n");
    let text = html_tag_regex().replace_all(&text, "");

    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn unescape_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push(' '),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Derive a group id from a free-text title: every run of characters that
/// are not alphanumeric becomes one `_`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        "group".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_every_pair() {
        for (open, close, shape) in SHAPE_DELIMITERS {
            assert_eq!(classify_shape(open, close), Some(shape));
        }
        assert_eq!(classify_shape("((", "))"), Some(ShapeKind::Circle));
        assert_eq!(classify_shape("[(", ")]"), Some(ShapeKind::Rectangle));
        assert_eq!(classify_shape("(", ")"), Some(ShapeKind::Rounded));
        assert_eq!(classify_shape("[", ")"), None);
    }

    #[test]
    fn test_openers_precede_their_prefixes() {
        for (idx, (open, _, _)) in SHAPE_DELIMITERS.iter().enumerate() {
            for (earlier, _, _) in &SHAPE_DELIMITERS[..idx] {
                assert!(
                    !(open.starts_with(earlier) && open != earlier),
                    "{open} is shadowed by {earlier}"
                );
            }
        }
    }

    #[test]
    fn test_quoted_label_newlines_collapse() {
        assert_eq!(
            normalize_label("Transactions Database\n(MySQL)", true),
            "Transactions Database (MySQL)"
        );
        assert_eq!(
            normalize_label(r"Transactions Database\n(MySQL)", true),
            "Transactions Database (MySQL)"
        );
    }

    #[test]
    fn test_quoted_label_unescape() {
        assert_eq!(normalize_label(r#"say \"hi\" \\ bye"#, true), r#"say "hi" \ bye"#);
    }

    #[test]
    fn test_br_tags_become_line_breaks() {
        assert_eq!(normalize_label("one<br>two<BR/>three<br />four", false), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_other_tags_stripped() {
        assert_eq!(normalize_label("<b>bold</b> and <i>it</i>", false), "bold and it");
        assert_eq!(normalize_label("a < b > c", false), "a < b > c");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Overall System"), "Overall_System");
        assert_eq!(slugify("  Edge, CDN (v2) "), "Edge_CDN_v2");
        assert_eq!(slugify("!!!"), "group");
    }
}

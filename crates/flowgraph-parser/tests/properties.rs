use proptest::prelude::*;

use flowgraph_parser::{
    ErrorCode, StreamEvent, StreamParser, parse, parse_with_diagnostics, sanitize,
};

// ===================
// Strategies
// ===================

/// Node ids that can never collide with a diagram keyword.
fn node_id_strategy() -> impl Strategy<Value = String> {
    "n[a-z0-9_]{0,6}"
}

/// Labels mixing plain words with the punctuation the sanitizer quotes.
fn label_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ][A-Za-z0-9 (),:;]{0,15}"
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (node_id_strategy(), label_strategy(), node_id_strategy())
            .prop_map(|(a, label, b)| format!("{a}[{label}] --> {b}")),
        (node_id_strategy(), "[A-Za-z0-9 ,:;]{1,16}")
            .prop_map(|(a, label)| format!("{a}({label})")),
        "[A-Z][A-Za-z ,()]{0,12}".prop_map(|title| format!("subgraph {title}")),
        Just("end".to_string()),
        Just("%% comment".to_string()),
    ]
}

/// A single diagram built from generated statement lines.
fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..12)
        .prop_map(|lines| format!("graph TD\n{}", lines.join("\n")))
}

/// Noise without newlines or lowercase letters, so it can never contain a
/// diagram keyword or a fence.
fn noise_strategy() -> impl Strategy<Value = String> {
    "[A-Z !?.,]{0,20}"
}

// ===================
// Property Test Functions
// ===================

fn check_sanitize_idempotent(document: &str) -> Result<(), TestCaseError> {
    let once = sanitize(document);
    let twice = sanitize(&once);
    prop_assert_eq!(once, twice);
    Ok(())
}

fn check_sanitized_document_parses_cleanly(document: &str) -> Result<(), TestCaseError> {
    let (diagram, diagnostics) = parse_with_diagnostics(&sanitize(document));
    let unrecognized = diagnostics
        .iter()
        .filter(|d| d.code() == Some(ErrorCode::W100))
        .count();
    prop_assert_eq!(unrecognized, 0, "diagnostics: {:?}", diagnostics);
    for edge in diagram.edges() {
        prop_assert!(
            diagram.node(edge.source_id()).is_some() || diagram.group(edge.source_id()).is_some()
        );
    }
    Ok(())
}

fn check_stream_split_invariant(
    prefix: &str,
    document: &str,
    suffix: &str,
    cuts: &[usize],
) -> Result<(), TestCaseError> {
    let content = format!("{prefix}\n```mermaid\n{document}\n```\n{suffix}");

    let mut points: Vec<usize> = cuts
        .iter()
        .map(|cut| cut % (content.len() + 1))
        .filter(|&cut| content.is_char_boundary(cut))
        .collect();
    points.sort_unstable();
    points.dedup();

    let mut parser = StreamParser::new();
    let mut events = Vec::new();
    let mut start = 0;
    for point in points.into_iter().chain(std::iter::once(content.len())) {
        events.extend(parser.append(&content[start..point]));
        start = point;
    }
    events.extend(parser.finish());

    let done: Vec<_> = events
        .into_iter()
        .filter_map(|event| match event {
            StreamEvent::Done(text) => Some(text),
            StreamEvent::Partial(_) => None,
        })
        .collect();
    prop_assert_eq!(done, vec![document.trim().to_string()]);
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn sanitize_is_idempotent(document in document_strategy()) {
        check_sanitize_idempotent(&document)?;
    }

    #[test]
    fn sanitized_documents_parse_cleanly(document in document_strategy()) {
        check_sanitized_document_parses_cleanly(&document)?;
    }

    #[test]
    fn stream_result_independent_of_chunking(
        prefix in noise_strategy(),
        document in document_strategy(),
        suffix in noise_strategy(),
        cuts in prop::collection::vec(any::<usize>(), 0..6),
    ) {
        check_stream_split_invariant(&prefix, &document, &suffix, &cuts)?;
    }

    #[test]
    fn arbitrary_input_never_panics(input in any::<String>()) {
        let _ = parse(&sanitize(&input));
        let _ = flowgraph_parser::extract_diagram_source(&input);

        let mut parser = StreamParser::new();
        let mid = input.char_indices().nth(input.chars().count() / 2).map_or(0, |(i, _)| i);
        let _ = parser.append(&input[..mid]);
        let _ = parser.append(&input[mid..]);
        let _ = parser.finish();
    }
}

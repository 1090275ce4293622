use flowgraph_core::semantic::{EdgeType, ShapeKind};
use flowgraph_parser::{
    ErrorCode, StreamEvent, StreamParser, extract_diagram_source, parse, parse_with_diagnostics,
    sanitize,
};

#[test]
fn test_sanitized_labels_parse() {
    let source = sanitize("graph TD\nD[CDN (CloudFront)] --> S3[Bucket: assets, public]");
    let diagram = parse(&source);

    assert_eq!(diagram.node("D").unwrap().label(), "CDN (CloudFront)");
    assert_eq!(diagram.node("S3").unwrap().label(), "Bucket: assets, public");
    assert_eq!(diagram.edges().len(), 1);
}

#[test]
fn test_sanitized_subgraph_title_parses() {
    let source = sanitize("graph TD\nsubgraph Frontend (Global)\nA-->B\nend");
    let diagram = parse(&source);

    let group = &diagram.groups()[0];
    assert_eq!(group.title(), "Frontend (Global)");
    assert_eq!(group.id(), "Frontend_Global");
    assert_eq!(group.member_node_ids().len(), 2);
}

#[test]
fn test_markdown_answer_end_to_end() {
    let content = r#"Here is the architecture you asked for:

```mermaid
flowchart LR
    %% edge tier
    user((User)) -->|HTTPS| cdn[CDN (CloudFront)]
    subgraph Backend Services
        direction TB
        api([API Gateway]) --> svc{Router}
        svc -.-> db[("Orders DB")]
    end
    cdn ==> api
```

Let me know if you need changes."#;

    let source = sanitize(&extract_diagram_source(content));
    let (diagram, diagnostics) = parse_with_diagnostics(&source);

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(diagram.nodes().len(), 5);
    assert_eq!(diagram.edges().len(), 4);

    assert_eq!(diagram.node("user").unwrap().shape(), ShapeKind::Circle);
    assert_eq!(diagram.node("api").unwrap().shape(), ShapeKind::Stadium);
    assert_eq!(diagram.node("svc").unwrap().shape(), ShapeKind::Diamond);
    assert_eq!(diagram.node("db").unwrap().label(), "Orders DB");
    assert_eq!(diagram.node("cdn").unwrap().group_id(), None);
    assert_eq!(
        diagram.node("db").unwrap().group_id(),
        Some("Backend_Services")
    );

    let types: Vec<_> = diagram.edges().iter().map(|e| e.edge_type()).collect();
    assert_eq!(
        types,
        vec![
            EdgeType::Arrow,
            EdgeType::Arrow,
            EdgeType::Dotted,
            EdgeType::Thick
        ]
    );
    assert_eq!(diagram.edges()[0].label(), Some("HTTPS"));
}

#[test]
fn test_streamed_text_matches_extracted_text() {
    let content = "Sure!\n```mermaid\ngraph TD\nA-->B\nB-->C\n```\nAnything else?";

    let mut parser = StreamParser::new();
    let mut done = None;
    for chunk in content.as_bytes().chunks(5) {
        let chunk = std::str::from_utf8(chunk).unwrap();
        for event in parser.append(chunk) {
            if let StreamEvent::Done(text) = event {
                done = Some(text);
            }
        }
    }

    assert_eq!(done.as_deref(), Some("graph TD\nA-->B\nB-->C"));
    assert_eq!(done.unwrap(), extract_diagram_source(content));
}

#[test]
fn test_malformed_document_is_best_effort() {
    let (diagram, diagnostics) =
        parse_with_diagnostics("graph TD\nA --> B\n-->\nsubgraph\nC[unclosed\nend\nend");

    assert_eq!(diagram.edges().len(), 1);
    let codes: Vec<_> = diagnostics.iter().filter_map(|d| d.code()).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::W100, ErrorCode::W100, ErrorCode::W200]
    );
}

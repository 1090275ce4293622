//! Integration tests for the GraphBuilder API and `convert_to_graph`.

use flowgraph::{
    FlowgraphError, GraphBuilder,
    color::{Color, shape_colors},
    config::AppConfig,
    convert_to_graph,
    geometry::{Bounds, Point},
    render::{RenderGraph, RenderNodeKind},
    semantic::ShapeKind,
};

/// Absolute bounds of a render node, following its parent chain.
fn absolute_bounds(graph: &RenderGraph, id: &str) -> Bounds {
    let node = graph.node(id).expect("node exists");
    let mut origin = node.position();
    let mut parent = node.parent_node();
    while let Some(parent_id) = parent {
        let parent_node = graph.node(parent_id).expect("parent exists");
        origin = origin.add_point(parent_node.position());
        parent = parent_node.parent_node();
    }
    Bounds::new_from_top_left(origin, node.size())
}

#[test]
fn test_simple_graph_round_trip() {
    let graph = convert_to_graph("graph LR\nA[Node A] --> B(Node B)");

    assert_eq!(graph.nodes().len(), 2);
    let a = graph.node("A").unwrap();
    let b = graph.node("B").unwrap();
    assert_eq!(a.label(), "Node A");
    assert_eq!(b.label(), "Node B");
    assert_eq!(b.shape(), Some(ShapeKind::Rounded));
    assert!(a.position().x() < b.position().x(), "LR places A left of B");

    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0].source(), "A");
    assert_eq!(graph.edges()[0].target(), "B");
}

#[test]
fn test_nested_parent_chain() {
    let source = r#"graph TD
    subgraph Overall_System[Overall System]
        subgraph Component_A[Component A]
            subgraph Subcomponent_B[Subcomponent B]
                X[Worker]
            end
        end
    end
    X --> Y[Outside]"#;
    let graph = convert_to_graph(source);

    let ids: Vec<_> = graph.nodes().iter().map(|n| n.id()).collect();
    assert_eq!(
        ids,
        vec!["Overall_System", "Component_A", "Subcomponent_B", "X", "Y"]
    );

    let x = graph.node("X").unwrap();
    assert_eq!(x.parent_node(), Some("Subcomponent_B"));
    let b = graph.node("Subcomponent_B").unwrap();
    assert_eq!(b.kind(), RenderNodeKind::Group);
    assert_eq!(b.parent_node(), Some("Component_A"));
    let a = graph.node("Component_A").unwrap();
    assert_eq!(a.parent_node(), Some("Overall_System"));
    assert_eq!(graph.node("Overall_System").unwrap().parent_node(), None);
    assert_eq!(graph.node("Y").unwrap().parent_node(), None);

    for (child, parent) in [
        ("X", "Subcomponent_B"),
        ("Subcomponent_B", "Component_A"),
        ("Component_A", "Overall_System"),
    ] {
        let child = absolute_bounds(&graph, child);
        let parent = absolute_bounds(&graph, parent);
        assert!(child.min_x() >= parent.min_x() && child.max_x() <= parent.max_x() + 1e-3);
        assert!(child.min_y() > parent.min_y() && child.max_y() <= parent.max_y() + 1e-3);
    }
}

#[test]
fn test_determinism() {
    let source = r#"flowchart TD
    A[Start] --> B{Is it?}
    B -->|Yes| C[OK]
    C --> D[Rethink]
    D --> B
    B ---->|No| E[End]
    subgraph Tools
        T1 & T2 --> T3
    end
    E -.-> T1"#;

    let first = convert_to_graph(source);
    let second = convert_to_graph(source);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_styles_depend_only_on_shape_and_edge_index() {
    let graph = convert_to_graph("graph TD\nA{One} --> B{Two}\nB --> C[Three]\nC --> D{Four}");

    for id in ["A", "B", "D"] {
        assert_eq!(
            graph.node(id).unwrap().style(),
            &shape_colors(ShapeKind::Diamond)
        );
    }
    assert_eq!(
        graph.node("C").unwrap().style(),
        &shape_colors(ShapeKind::Rectangle)
    );

    let colors: Vec<_> = graph.edges().iter().map(|e| e.color().clone()).collect();
    assert_ne!(colors[0], colors[1]);
    assert_ne!(colors[1], colors[2]);
}

#[test]
fn test_top_level_boxes_do_not_overlap() {
    let source = r#"graph LR
    subgraph Frontend
        web[Web App] --> cdn[CDN]
    end
    subgraph Backend
        api[API] --> db[(Database)]
        api --> cache[Cache]
    end
    cdn --> api
    user((User)) --> web
    admin((Admin)) --> api"#;
    let graph = convert_to_graph(source);

    let top_level: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|n| n.parent_node().is_none())
        .map(|n| absolute_bounds(&graph, n.id()))
        .collect();
    assert_eq!(top_level.len(), 4);
    for (i, a) in top_level.iter().enumerate() {
        for b in &top_level[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_markdown_answer() {
    let content = "Sure, here it is:\n\n```mermaid\ngraph TD\nA[CDN (CloudFront)] --> B[S3: assets]\n```\n\nAnything else?";
    let graph = convert_to_graph(content);

    assert_eq!(graph.node("A").unwrap().label(), "CDN (CloudFront)");
    assert_eq!(graph.node("B").unwrap().label(), "S3: assets");
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn test_malformed_input_does_not_crash() {
    for content in [
        "",
        "not a diagram at all",
        "graph TD\n-->\n[[[\nend\nend",
        "graph TD\nsubgraph\nA --> \n",
        "graph TD\nA --> ghost_group_edge\nsubgraph G\nend\nA --> G",
        "```mermaid\n```",
    ] {
        let _ = convert_to_graph(content);
    }
    assert!(convert_to_graph("").is_empty());
}

#[test]
fn test_empty_group_is_a_box() {
    let graph = convert_to_graph("graph TD\nsubgraph Empty\nend\nA --> B");

    let empty = graph.node("Empty").unwrap();
    assert_eq!(empty.kind(), RenderNodeKind::Group);
    assert!(empty.size().width() > 0.0 && empty.size().height() > 0.0);
}

#[test]
fn test_builder_stages() {
    let builder = GraphBuilder::new(AppConfig::default());
    let source = builder.prepare("```mermaid\ngraph TD\nA --> B\n???\n```");
    assert_eq!(source, "graph TD\nA --> B\n???");

    let (diagram, diagnostics) = builder.parse(&source);
    assert_eq!(diagnostics.len(), 1);
    let span = diagnostics[0].span().unwrap();
    assert_eq!(&source[span.as_range()], "???");

    let layout = builder.layout(&diagram).unwrap();
    assert_eq!(layout.top_level().len(), 2);
    let graph = builder.compose(&diagram, &layout).unwrap();
    assert_eq!(graph, builder.convert(&source).unwrap());
    assert_eq!(graph.node("A").unwrap().position(), layout.top_level()["A"].position());
    assert!(graph.node("B").unwrap().position() != Point::new(0.0, 0.0));
}

#[test]
fn test_builder_with_config() {
    let config: AppConfig = toml::from_str(
        r##"
        [layout]
        group_padding = 40

        [style]
        edge_palette = ["#ff0000"]
        "##,
    )
    .expect("valid config");
    config.validate().expect("config passes validation");

    let builder = GraphBuilder::new(config);
    let graph = builder
        .convert("graph TD\nsubgraph G\nA --> B\nend\nB --> C")
        .unwrap();

    let red = Color::new("#ff0000").unwrap();
    assert!(graph.edges().iter().all(|e| e.color() == &red));
    let a = graph.node("A").unwrap();
    assert!(a.position().x() >= 40.0);
}

#[test]
fn test_unvalidated_config_is_reported_not_panicked() {
    let config: AppConfig =
        toml::from_str("[layout.node]\nmin_width = 400.0\nmax_width = 100.0").unwrap();
    let builder = GraphBuilder::new(config);

    let err = builder.convert("graph TD\nA --> B").unwrap_err();
    assert!(matches!(err, FlowgraphError::Config(_)));
    assert!(err.to_string().contains("layout.node.min_width"));
}

#[test]
fn test_invalid_palette_is_rejected() {
    let result: Result<AppConfig, _> = toml::from_str("[style]\nedge_palette = [\"nope\"]");
    assert!(result.is_err());
}

#[test]
fn test_render_graph_serializes_to_camel_case_json() {
    let graph = convert_to_graph("graph TD\nsubgraph G\nA -.-> B\nend");
    let json = serde_json::to_value(&graph).unwrap();

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes[0]["kind"], "group");
    assert_eq!(nodes[1]["parentNode"], "G");
    assert_eq!(nodes[1]["extent"], "parent");
    assert_eq!(json["edges"][0]["animated"], true);
    assert_eq!(json["edges"][0]["edgeType"], "dotted");
}

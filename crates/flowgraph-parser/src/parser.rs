//! Statement grammar for the flowchart DSL.
//!
//! Every statement produced by [`source`](super::source) is parsed on its
//! own into a [`Statement`](super::parser_types::Statement). A statement that
//! does not match the grammar as a whole is rejected; the builder reports it
//! and moves on.

use winnow::{
    Parser as _,
    ascii::{multispace0, multispace1, space1},
    combinator::{alt, delimited, eof, not, opt, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode, ModalResult, StrContext},
    stream::{LocatingSlice, Stream},
    token::{any, none_of, one_of, rest, take_until, take_while},
};

use flowgraph_core::semantic::{Direction, EdgeType};

use crate::{
    keywords::starts_with_keyword,
    label::{SHAPE_DELIMITERS, normalize_label, slugify},
    parser_types::{Chain, Link, NodeRef, NodeShape, Statement, SubgraphHeader},
    span::Span,
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O>;

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// Identifier characters. `-` is additionally allowed between them.
fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `order-service`, `A1`, `node_2`. A `-` must be followed by another
/// identifier character so that `A-->B` stops at `A`.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        take_while(1.., is_id_char),
        repeat::<_, _, (), _, _>(0.., ('-', take_while(1.., is_id_char))),
    )
        .take()
        .context(StrContext::Label("identifier"))
        .parse_next(input)
}

/// Body of a double-quoted string with escapes left in place.
fn quoted_text<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    repeat::<_, _, (), _, _>(
        0..,
        alt((preceded('\\', any).void(), none_of(['"', '\\']).void())),
    )
    .take()
    .parse_next(input)
}

fn quoted_string<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    delimited('"', quoted_text, '"')
        .context(StrContext::Label("quoted string"))
        .parse_next(input)
}

/// Unquoted label text up to `close`, skipping over balanced brackets so
/// that `B(Rounded (kept))` keeps its inner parentheses.
fn balanced_until<'a>(input: &mut Input<'a>, close: &str) -> IResult<&'a str> {
    let remaining = input.peek_finish();
    let mut depth = 0usize;
    for (idx, c) in remaining.char_indices() {
        if depth == 0 && remaining[idx..].starts_with(close) {
            return Ok(input.next_slice(idx));
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Err(backtrack())
}

/// Label between a shape's delimiters, including the closing delimiter.
/// Returns the raw text and whether it was quoted.
fn label_body<'a>(input: &mut Input<'a>, close: &'static str) -> IResult<(&'a str, bool)> {
    alt((
        delimited(
            (multispace0, '"'),
            quoted_text,
            ('"', multispace0, close),
        )
        .map(|raw| (raw, true)),
        terminated(move |i: &mut Input<'a>| balanced_until(i, close), close)
            .map(|raw| (raw, false)),
    ))
    .parse_next(input)
}

/// Shape delimiters and label directly following a node id.
fn node_shape<'a>(input: &mut Input<'a>) -> IResult<NodeShape> {
    for (open, close, kind) in SHAPE_DELIMITERS {
        let checkpoint = input.checkpoint();
        match preceded(open, |i: &mut Input<'a>| label_body(i, close)).parse_next(input) {
            Ok((raw, quoted)) => {
                return Ok(NodeShape {
                    kind,
                    label: normalize_label(raw, quoted),
                });
            }
            Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
            Err(err) => return Err(err),
        }
    }
    Err(backtrack())
}

/// `:::className` styling suffix; parsed and discarded.
fn class_suffix(input: &mut Input<'_>) -> IResult<()> {
    (":::", take_while(1.., |c: char| is_id_char(c) || c == '-'))
        .void()
        .parse_next(input)
}

fn node_ref(input: &mut Input<'_>) -> IResult<NodeRef> {
    let ((id, shape), range) = terminated((identifier, opt(node_shape)), opt(class_suffix))
        .with_span()
        .parse_next(input)?;
    Ok(NodeRef {
        id: id.to_string(),
        shape,
        span: Span::new(range),
    })
}

/// `A`, `A & B[Label] & C`.
fn node_list(input: &mut Input<'_>) -> IResult<Vec<NodeRef>> {
    separated(1.., node_ref, (multispace0, '&', multispace0))
        .context(StrContext::Label("node"))
        .parse_next(input)
}

/// `-->`, `---`, `--o`, `--x` and their longer spellings.
fn normal_connector(input: &mut Input<'_>) -> IResult<EdgeType> {
    let dashes = take_while(2.., '-').parse_next(input)?;
    let head = opt(alt((
        '>'.value(EdgeType::Arrow),
        terminated('o', not(one_of(is_id_char))).value(EdgeType::Circle),
        terminated('x', not(one_of(is_id_char))).value(EdgeType::Cross),
    )))
    .parse_next(input)?;

    match head {
        Some(edge_type) => Ok(edge_type),
        None if dashes.len() >= 3 => Ok(EdgeType::Open),
        None => Err(backtrack()),
    }
}

/// `-.->`, `-.-`, `-..->`.
fn dotted_connector(input: &mut Input<'_>) -> IResult<EdgeType> {
    ('-', take_while(1.., '.'), '-', opt('>'))
        .map(|(_, _, _, head)| {
            if head.is_some() {
                EdgeType::Dotted
            } else {
                EdgeType::DottedOpen
            }
        })
        .parse_next(input)
}

/// `==>`, `===`, `====>`.
fn thick_connector(input: &mut Input<'_>) -> IResult<EdgeType> {
    let equals = take_while(2.., '=').parse_next(input)?;
    match opt('>').parse_next(input)? {
        Some(_) => Ok(EdgeType::Thick),
        None if equals.len() >= 3 => Ok(EdgeType::ThickOpen),
        None => Err(backtrack()),
    }
}

/// `~~~`.
fn invisible_connector(input: &mut Input<'_>) -> IResult<EdgeType> {
    take_while(3.., '~')
        .value(EdgeType::Invisible)
        .parse_next(input)
}

/// `<-->`, `<==>`, `<-.->`.
fn bidirectional_connector(input: &mut Input<'_>) -> IResult<EdgeType> {
    preceded(
        '<',
        alt((
            (take_while(2.., '-'), '>').void(),
            (take_while(2.., '='), '>').void(),
            ('-', take_while(1.., '.'), '-', '>').void(),
        )),
    )
    .value(EdgeType::Bidirectional)
    .parse_next(input)
}

/// Connector with inline text: `-- text -->`, `-. text .->`, `== text ==>`.
fn inline_text_connector<'a>(input: &mut Input<'a>) -> IResult<(EdgeType, Option<&'a str>)> {
    alt((
        preceded("--", (take_until(1.., "--"), normal_connector)),
        preceded(
            "-.",
            (
                take_until(1.., ".-"),
                preceded(".-", opt('>')).map(|head| {
                    if head.is_some() {
                        EdgeType::Dotted
                    } else {
                        EdgeType::DottedOpen
                    }
                }),
            ),
        ),
        preceded("==", (take_until(1.., "=="), thick_connector)),
    ))
    .map(|(text, edge_type)| (edge_type, Some(text)))
    .parse_next(input)
}

fn pipe_label<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    delimited('|', take_until(0.., "|"), '|')
        .context(StrContext::Label("edge label"))
        .parse_next(input)
}

/// Display text for an edge label; surrounding quotes are optional.
fn edge_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let label = match trimmed
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => normalize_label(inner, true),
        None => normalize_label(trimmed, false),
    };
    (!label.is_empty()).then_some(label)
}

fn link(input: &mut Input<'_>) -> IResult<Link> {
    let (edge_type, inline) = alt((
        bidirectional_connector.map(|t| (t, None::<&str>)),
        dotted_connector.map(|t| (t, None)),
        normal_connector.map(|t| (t, None)),
        thick_connector.map(|t| (t, None)),
        invisible_connector.map(|t| (t, None)),
        inline_text_connector,
    ))
    .context(StrContext::Label("connector"))
    .parse_next(input)?;

    let piped = opt(preceded(multispace0, pipe_label)).parse_next(input)?;
    let label = piped.or(inline).and_then(edge_label);

    Ok(Link { edge_type, label })
}

fn chain(input: &mut Input<'_>) -> IResult<Chain> {
    let head = node_list.parse_next(input)?;
    let links = repeat(
        1..,
        (delimited(multispace0, link, multispace0), node_list),
    )
    .parse_next(input)?;
    Ok(Chain { head, links })
}

/// Text after `subgraph`, minus any trailing `|...|` annotation.
fn subgraph(input: &mut Input<'_>) -> IResult<SubgraphHeader> {
    let text = preceded("subgraph", alt((preceded(multispace1, rest), eof))).parse_next(input)?;

    let text = strip_annotation(text);
    if text.is_empty() {
        return Ok(SubgraphHeader {
            id: None,
            title: None,
        });
    }

    let mut header_input = LocatingSlice::new(text);
    subgraph_header.parse_next(&mut header_input)
}

fn strip_annotation(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_suffix('|').and_then(|head| head.rfind('|')) {
        Some(open) => trimmed[..open].trim_end(),
        None => trimmed,
    }
}

/// `id`, `id[Title]`, `id ["Title"]`, `"Title"` or free text.
fn subgraph_header<'a>(input: &mut Input<'a>) -> IResult<SubgraphHeader> {
    alt((
        terminated(quoted_string, (multispace0, eof)).map(|raw| SubgraphHeader {
            id: None,
            title: Some(normalize_label(raw, true)),
        }),
        (
            identifier,
            preceded(
                (multispace0, '['),
                |i: &mut Input<'a>| label_body(i, "]"),
            ),
            (multispace0, eof),
        )
            .map(|(id, (raw, quoted), _)| SubgraphHeader {
                id: Some(id.to_string()),
                title: Some(normalize_label(raw, quoted)),
            }),
        terminated(identifier, (multispace0, eof)).map(|id: &str| SubgraphHeader {
            id: Some(id.to_string()),
            title: None,
        }),
        rest.map(|text: &str| {
            let title = normalize_label(text, false);
            SubgraphHeader {
                id: Some(slugify(&title)),
                title: Some(title),
            }
        }),
    ))
    .parse_next(input)
}

fn end(input: &mut Input<'_>) -> IResult<()> {
    ("end", multispace0, eof).void().parse_next(input)
}

fn direction(input: &mut Input<'_>) -> IResult<Direction> {
    preceded(
        ("direction", space1),
        terminated(
            take_while(2, |c: char| c.is_ascii_alphabetic()),
            (multispace0, eof),
        ),
    )
    .verify_map(Direction::from_keyword)
    .context(StrContext::Label("direction"))
    .parse_next(input)
}

/// Styling and interaction statements, recognized only to be skipped.
fn unsupported(input: &mut Input<'_>) -> IResult<&'static str> {
    terminated(
        alt((
            "classDef".value("classDef"),
            "class".value("class"),
            "style".value("style"),
            "click".value("click"),
            "linkStyle".value("linkStyle"),
        )),
        space1,
    )
    .parse_next(input)
}

fn statement(input: &mut Input<'_>) -> IResult<Statement> {
    alt((
        subgraph.map(Statement::Subgraph),
        end.value(Statement::End),
        direction.map(Statement::Direction),
        terminated(chain, (multispace0, eof)).map(Statement::Chain),
        terminated(node_list, (multispace0, eof)).map(Statement::Nodes),
        unsupported.map(Statement::Unsupported),
    ))
    .parse_next(input)
}

/// Parse one statement. `offset` is the statement's byte position in the
/// diagram text; node spans are reported relative to the whole text.
///
/// On failure, returns the label of the construct the grammar expected, if
/// one is known.
pub(crate) fn parse_statement(text: &str, offset: usize) -> Result<Statement, Option<&'static str>> {
    let mut input = LocatingSlice::new(text);
    match statement.parse_next(&mut input) {
        Ok(mut parsed) => {
            shift_spans(&mut parsed, offset);
            Ok(parsed)
        }
        Err(ErrMode::Backtrack(err) | ErrMode::Cut(err)) => {
            Err(err.context().find_map(|ctx| match ctx {
                StrContext::Label(label) => Some(*label),
                _ => None,
            }))
        }
        Err(ErrMode::Incomplete(_)) => Err(None),
    }
}

fn shift_spans(statement: &mut Statement, offset: usize) {
    let shift = |node: &mut NodeRef| {
        node.span = Span::new(node.span.start() + offset..node.span.end() + offset);
    };
    match statement {
        Statement::Chain(chain) => {
            chain.head.iter_mut().for_each(shift);
            chain
                .links
                .iter_mut()
                .flat_map(|(_, nodes)| nodes.iter_mut())
                .for_each(shift);
        }
        Statement::Nodes(nodes) => nodes.iter_mut().for_each(shift),
        _ => {}
    }
}

/// Direction declared on the header line (`graph LR`, `flowchart TB`).
pub(crate) fn header_direction(header: &str) -> Option<Direction> {
    if !starts_with_keyword(header) {
        return None;
    }
    header
        .split_whitespace()
        .nth(1)
        .and_then(Direction::from_keyword)
}

//! Structural checker for generated flowchart text.
//!
//! Accepts the subset of flowchart syntax this crate and the renderer emit:
//! a `graph`/`flowchart` header, node declarations in the classic bracket
//! shapes (plus `((circle))` and `@{ shape: ... }` annotations), and links
//! with an optional `|label|`. Styling and interaction directives are
//! recognised and skipped.

use std::fmt;

use chumsky::prelude::*;
use pc_core::{LinkStyle, Orientation, RESERVED_IDENTIFIERS};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// 1-based line number; 0 for whole-document findings.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            message: message.into(),
        }
    }

    fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.line == 0 {
            write!(f, "{severity}: {}", self.message)
        } else {
            write!(f, "line {}: {severity}: {}", self.line, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedNode {
    pub id: String,
    pub label: Option<String>,
    /// `square`, `round`, `rhombus`, `circle`, or an annotated shape name.
    pub shape: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedLink {
    pub source: String,
    pub target: String,
    pub style: LinkStyle,
    pub label: Option<String>,
    pub line: usize,
}

/// Result of [`check_flowchart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct FlowchartCheck {
    pub orientation: Option<Orientation>,
    pub nodes: Vec<CheckedNode>,
    pub links: Vec<CheckedLink>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FlowchartCheck {
    /// No error-level diagnostics. Warnings do not make a diagram invalid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&CheckedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone)]
struct StatementNode {
    id: String,
    label: Option<String>,
    shape: String,
}

#[derive(Debug, Clone)]
enum Statement {
    Node(StatementNode),
    Link {
        from: StatementNode,
        style: LinkStyle,
        label: Option<String>,
        to: StatementNode,
    },
    Directive,
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Build a chumsky parser for a single flowchart statement.
fn statement_parser<'a>() -> impl Parser<'a, &'a str, Statement, extra::Err<Rich<'a, char>>> {
    let ws_char = any().filter(|c: &char| *c == ' ' || *c == '\t');
    let inline_ws = ws_char.repeated().to(());
    let required_ws = ws_char.repeated().at_least(1).to(());

    // Identifiers may contain single hyphens between word segments, so
    // `a-b --> c` reads `a-b` but `a-->b` stops before the arrow.
    let segment = any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1);
    let ident = segment
        .clone()
        .then(just('-').then(segment).repeated())
        .to_slice()
        .map(ToString::to_string);

    let quoted = just('"')
        .ignore_then(
            just('\\')
                .ignore_then(any())
                .or(any().filter(|c: &char| *c != '"' && *c != '\\'))
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'));

    let circle = just("((")
        .ignore_then(inline_ws)
        .ignore_then(
            quoted.clone().then_ignore(inline_ws).or(any()
                .and_is(just("))").not())
                .repeated()
                .collect::<String>()),
        )
        .then_ignore(just("))"));

    let square = just('[')
        .ignore_then(inline_ws)
        .ignore_then(
            quoted.clone().then_ignore(inline_ws).or(any()
                .filter(|c: &char| *c != ']')
                .repeated()
                .collect::<String>()),
        )
        .then_ignore(just(']'));

    let round = just('(')
        .ignore_then(inline_ws)
        .ignore_then(
            quoted.clone().then_ignore(inline_ws).or(any()
                .filter(|c: &char| *c != ')')
                .repeated()
                .collect::<String>()),
        )
        .then_ignore(just(')'));

    let rhombus = just('{')
        .ignore_then(inline_ws)
        .ignore_then(
            quoted.clone().then_ignore(inline_ws).or(any()
                .filter(|c: &char| *c != '}')
                .repeated()
                .collect::<String>()),
        )
        .then_ignore(just('}'));

    let shape_name = any()
        .filter(|c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(ToString::to_string);

    let annotation = just("@{")
        .ignore_then(inline_ws)
        .ignore_then(just("shape"))
        .ignore_then(inline_ws)
        .ignore_then(just(':'))
        .ignore_then(inline_ws)
        .ignore_then(shape_name)
        .then_ignore(inline_ws)
        .then_ignore(just('}'));

    // Multi-character delimiters and annotated forms are tried first.
    let node_shape = choice((
        circle.map(|label| (label, "circle".to_string())),
        square.clone().then_ignore(inline_ws).then(annotation),
        square.map(|label| (label, "square".to_string())),
        round.map(|label| (label, "round".to_string())),
        rhombus.map(|label| (label, "rhombus".to_string())),
    ));

    let node = ident
        .then(node_shape.or_not())
        .map(|(id, shape): (String, Option<(String, String)>)| match shape {
            Some((label, shape)) => StatementNode {
                id,
                label: non_empty(label),
                shape,
            },
            None => StatementNode {
                id,
                label: None,
                shape: "square".to_string(),
            },
        });

    // Longest operators first.
    let style = choice((
        just("<-->").to(LinkStyle::Bidirectional),
        just("-.->").to(LinkStyle::Dotted),
        just("o--o").to(LinkStyle::CircleEnds),
        just("x--x").to(LinkStyle::CrossEnds),
        just("==>").to(LinkStyle::Thick),
        just("-->").to(LinkStyle::Arrow),
        just("---").to(LinkStyle::Open),
    ));

    let pipe_label = just('|')
        .ignore_then(inline_ws)
        .ignore_then(
            quoted.then_ignore(inline_ws).or(any()
                .filter(|c: &char| *c != '|')
                .repeated()
                .collect::<String>()),
        )
        .then_ignore(just('|'))
        .map(non_empty);

    let link = node
        .clone()
        .then_ignore(inline_ws)
        .then(style)
        .then_ignore(inline_ws)
        .then(pipe_label.clone().or_not())
        .then_ignore(inline_ws)
        .then(node.clone())
        .then_ignore(inline_ws)
        .then(pipe_label.or_not())
        .then_ignore(inline_ws)
        .then_ignore(end())
        .map(|((((from, style), leading), to), trailing)| Statement::Link {
            from,
            style,
            label: leading.flatten().or(trailing.flatten()),
            to,
        });

    let directive = choice((
        just("style").to(()),
        just("linkStyle").to(()),
        just("classDef").to(()),
        just("class").to(()),
        just("click").to(()),
        just("subgraph").to(()),
        just("direction").to(()),
    ))
    .then(required_ws)
    .then(any().repeated())
    .then_ignore(end())
    .to(Statement::Directive);

    let subgraph_end = just("end").then(inline_ws).then(end()).to(Statement::Directive);

    choice((
        directive,
        subgraph_end,
        link,
        node.then_ignore(inline_ws)
            .then_ignore(end())
            .map(Statement::Node),
    ))
}

fn parse_header(line: &str) -> Option<Result<Orientation, String>> {
    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    if keyword != "graph" && keyword != "flowchart" {
        return None;
    }
    let orientation = match words.next() {
        None => Ok(Orientation::default()),
        Some(raw) => Orientation::parse(raw).ok_or_else(|| format!("unknown orientation `{raw}`")),
    };
    if let Some(extra) = words.next() {
        return Some(Err(format!("unexpected `{extra}` after header")));
    }
    Some(orientation)
}

/// Check flowchart text line by line.
///
/// Errors: missing or malformed header, statements that do not parse.
/// Warnings: links to undeclared nodes, conflicting redeclarations, and
/// reserved words used as node identifiers.
#[must_use]
pub fn check_flowchart(input: &str) -> FlowchartCheck {
    let mut check = FlowchartCheck::default();
    let mut saw_header = false;
    let parser = statement_parser();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }

        if let Some(header) = parse_header(trimmed) {
            if saw_header {
                check
                    .diagnostics
                    .push(Diagnostic::error(line_number, "duplicate graph header"));
            }
            saw_header = true;
            match header {
                Ok(orientation) => check.orientation = Some(orientation),
                Err(message) => check.diagnostics.push(Diagnostic::error(line_number, message)),
            }
            continue;
        }

        if !saw_header {
            check.diagnostics.push(Diagnostic::error(
                line_number,
                "expected `graph <orientation>` header before statements",
            ));
            saw_header = true;
        }

        let statement = trimmed.trim_end_matches(';');
        let (ast, errors) = parser.parse(statement).into_output_errors();
        match ast {
            Some(ast) if errors.is_empty() => record(&mut check, ast, line_number),
            _ => {
                let reason = errors
                    .first()
                    .map_or_else(|| "unrecognised statement".to_string(), ToString::to_string);
                check.diagnostics.push(Diagnostic::error(
                    line_number,
                    format!("could not parse `{statement}`: {reason}"),
                ));
            }
        }
    }

    if !saw_header {
        check
            .diagnostics
            .push(Diagnostic::error(0, "diagram is empty"));
    }

    for link in &check.links {
        for endpoint in [&link.source, &link.target] {
            if check.find_node(endpoint).is_none() {
                check.diagnostics.push(Diagnostic::warning(
                    link.line,
                    format!("link references undeclared node `{endpoint}`"),
                ));
            }
        }
    }
    debug!(
        nodes = check.nodes.len(),
        links = check.links.len(),
        diagnostics = check.diagnostics.len(),
        "checked flowchart"
    );
    check
}

fn record(check: &mut FlowchartCheck, statement: Statement, line: usize) {
    match statement {
        Statement::Node(node) => declare(check, node, line),
        Statement::Link {
            from,
            style,
            label,
            to,
        } => {
            let source = from.id.clone();
            let target = to.id.clone();
            // Endpoints only count as declarations when they carry a shape.
            if from.label.is_some() {
                declare(check, from, line);
            }
            if to.label.is_some() {
                declare(check, to, line);
            }
            check.links.push(CheckedLink {
                source,
                target,
                style,
                label,
                line,
            });
        }
        Statement::Directive => {}
    }
}

fn declare(check: &mut FlowchartCheck, node: StatementNode, line: usize) {
    if RESERVED_IDENTIFIERS.contains(&node.id.as_str()) {
        check.diagnostics.push(Diagnostic::warning(
            line,
            format!("node id `{}` is a reserved word", node.id),
        ));
    }
    if let Some(existing) = check.nodes.iter().find(|existing| existing.id == node.id) {
        if node.label.is_some() && existing.label != node.label {
            check.diagnostics.push(Diagnostic::warning(
                line,
                format!(
                    "node `{}` redeclared with a different label (first declared on line {})",
                    node.id, existing.line
                ),
            ));
        }
        return;
    }
    check.nodes.push(CheckedNode {
        id: node.id,
        label: node.label,
        shape: node.shape,
        line,
    });
}

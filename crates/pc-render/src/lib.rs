#![forbid(unsafe_code)]

//! Deterministic rendering of a [`GraphDocument`] into flowchart text.

mod identifiers;

pub use identifiers::{IdentifierMap, sanitize_identifier};

use std::fmt::Write as _;

use pc_core::{GraphDocument, GraphLink, GraphNode, NodeShape};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("node #{index} has an empty id")]
    EmptyNodeId { index: usize },
    #[error("link #{index} has an empty {endpoint} id")]
    EmptyLinkEndpoint {
        index: usize,
        endpoint: &'static str,
    },
}

/// Configuration for flowchart rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Prefix for node definition lines.
    pub indent: String,
    /// Prefix added to node ids that collide with grammar keywords.
    pub reserved_prefix: String,
    /// Quote every node label. When off, labels are quoted only if they
    /// contain quote or bracket characters.
    pub quote_labels: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: String::from("    "),
            reserved_prefix: String::from("id_"),
            quote_labels: true,
        }
    }
}

impl RenderConfig {
    /// Bare labels wherever the grammar allows them.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            quote_labels: false,
            ..Self::default()
        }
    }
}

/// Render a graph document with the default configuration.
///
/// # Errors
///
/// Returns [`RenderError`] when a node id or link endpoint is empty.
pub fn render(document: &GraphDocument) -> Result<String, RenderError> {
    render_with_config(document, &RenderConfig::default())
}

/// Render a graph document with a custom configuration.
///
/// # Errors
///
/// Returns [`RenderError`] when a node id or link endpoint is empty. Nothing
/// is rendered in that case.
pub fn render_with_config(
    document: &GraphDocument,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    validate(document)?;

    let dangling = document.dangling_references();
    if !dangling.is_empty() {
        warn!(?dangling, "links reference undeclared nodes; rendering as-is");
    }

    let mut identifiers = IdentifierMap::for_document(document, config.reserved_prefix.as_str());
    let mut out = format!("graph {}\n", document.orientation.as_str());
    for node in &document.nodes {
        let id = identifiers.assign(&node.id).to_string();
        render_node(&mut out, &id, node, config);
    }
    for link in &document.links {
        let source = identifiers.assign(&link.source_id).to_string();
        let target = identifiers.assign(&link.target_id).to_string();
        render_link(&mut out, &source, &target, link);
    }

    debug!(
        nodes = document.nodes.len(),
        links = document.links.len(),
        bytes = out.len(),
        "rendered graph document"
    );
    Ok(out)
}

fn validate(document: &GraphDocument) -> Result<(), RenderError> {
    if let Some(index) = document
        .nodes
        .iter()
        .position(|node| node.id.trim().is_empty())
    {
        return Err(RenderError::EmptyNodeId { index });
    }
    for (index, link) in document.links.iter().enumerate() {
        if link.source_id.trim().is_empty() {
            return Err(RenderError::EmptyLinkEndpoint {
                index,
                endpoint: "source",
            });
        }
        if link.target_id.trim().is_empty() {
            return Err(RenderError::EmptyLinkEndpoint {
                index,
                endpoint: "target",
            });
        }
    }
    Ok(())
}

fn render_node(out: &mut String, id: &str, node: &GraphNode, config: &RenderConfig) {
    let _ = match &node.shape {
        // The annotated form is quoted whatever the config says.
        NodeShape::Named(name) => writeln!(
            out,
            "{}{id}[{}]@{{ shape: {name} }}",
            config.indent,
            node_label(&node.label, true)
        ),
        classic => {
            let label = node_label(&node.label, config.quote_labels);
            let (open, close) = classic.brackets().unwrap_or(("[", "]"));
            writeln!(out, "{}{id}{open}{label}{close}", config.indent)
        }
    };
}

fn render_link(out: &mut String, source: &str, target: &str, link: &GraphLink) {
    let style = link.style.as_str();
    let _ = match link.visible_label() {
        Some(label) => writeln!(
            out,
            "{source} {style} | {} | {target}",
            link_label(label)
        ),
        None => writeln!(out, "{source} {style} {target}"),
    };
}

fn break_lines(text: &str) -> String {
    text.replace("\r\n", "<br/>")
        .replace(['\n', '\r'], "<br/>")
}

fn needs_quotes(label: &str) -> bool {
    label
        .chars()
        .any(|ch| matches!(ch, '"' | '(' | ')' | '[' | ']' | '{' | '}' | '|'))
}

/// Node label text including its surrounding quotes, if any.
fn node_label(label: &str, always_quote: bool) -> String {
    let text = break_lines(label);
    if always_quote || needs_quotes(&text) {
        format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        text
    }
}

fn link_label(label: &str) -> String {
    break_lines(label).replace('|', "#124;")
}

use std::fmt::Write as _;

use pc_core::{GraphDocument, GraphLink, GraphNode, LinkStyle, NodeShape, Orientation, ShapeName};
use serde::Serialize;

/// A node extracted from a sentence. The first node is the circle-shaped root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceNode {
    pub id: String,
    pub label: String,
}

/// A directed edge between two extracted nodes, by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceEdge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
}

/// Intermediate graph produced by the sentence parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceGraph {
    pub orientation: Orientation,
    pub nodes: Vec<SentenceNode>,
    pub edges: Vec<SentenceEdge>,
}

impl SentenceGraph {
    /// Emit flowchart text: header, node lines, then edge lines, trimmed.
    #[must_use]
    pub fn to_mermaid(&self) -> String {
        let mut out = format!("graph {}\n", self.orientation.as_str());
        for (index, node) in self.nodes.iter().enumerate() {
            let (open, close) = if index == 0 { ("((", "))") } else { ("[", "]") };
            let _ = writeln!(out, "    {}{open}\"{}\"{close}", node.id, node.label);
        }
        for edge in &self.edges {
            let (Some(from), Some(to)) = (self.nodes.get(edge.from), self.nodes.get(edge.to))
            else {
                continue;
            };
            match &edge.label {
                Some(label) => {
                    let _ = writeln!(out, "    {} --> |\"{label}\"| {}", from.id, to.id);
                }
                None => {
                    let _ = writeln!(out, "    {} --> {}", from.id, to.id);
                }
            }
        }
        out.trim().to_string()
    }

    /// Convert to the structured document form so it can go through the
    /// renderer. The root node keeps its circle shape via `@{ shape: circle }`.
    #[must_use]
    pub fn to_document(&self) -> GraphDocument {
        let mut document = GraphDocument::new(self.orientation);
        for (index, node) in self.nodes.iter().enumerate() {
            let shape = if index == 0 {
                ShapeName::parse("circle").map_or(NodeShape::Round, NodeShape::Named)
            } else {
                NodeShape::Square
            };
            document
                .nodes
                .push(GraphNode::new(node.id.clone(), node.label.clone(), shape));
        }
        for edge in &self.edges {
            let (Some(from), Some(to)) = (self.nodes.get(edge.from), self.nodes.get(edge.to))
            else {
                continue;
            };
            let link = GraphLink::new(from.id.clone(), to.id.clone(), LinkStyle::Arrow);
            document.links.push(match &edge.label {
                Some(label) => link.with_label(label.clone()),
                None => link,
            });
        }
        document
    }
}

pub(crate) struct SentenceGraphBuilder {
    graph: SentenceGraph,
}

impl SentenceGraphBuilder {
    pub(crate) fn new(orientation: Orientation) -> Self {
        Self {
            graph: SentenceGraph {
                orientation,
                nodes: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    /// Append a node with id `node_<index>`. Blank labels are skipped.
    pub(crate) fn push_node(&mut self, label: &str) -> Option<usize> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let index = self.graph.nodes.len();
        self.graph.nodes.push(SentenceNode {
            id: format!("node_{index}"),
            label: label.to_string(),
        });
        Some(index)
    }

    pub(crate) fn push_edge(&mut self, from: usize, to: usize, label: Option<String>) {
        self.graph.edges.push(SentenceEdge { from, to, label });
    }

    /// `None` when no node was emitted.
    pub(crate) fn finish(self) -> Option<SentenceGraph> {
        if self.graph.nodes.is_empty() {
            None
        } else {
            Some(self.graph)
        }
    }
}

#[cfg(test)]
mod tests {
    use pc_core::{LinkStyle, NodeShape, Orientation};

    use super::SentenceGraphBuilder;

    #[test]
    fn builder_numbers_nodes_in_emission_order() {
        let mut builder = SentenceGraphBuilder::new(Orientation::TB);
        assert_eq!(builder.push_node("Client"), Some(0));
        assert_eq!(builder.push_node("   "), None);
        assert_eq!(builder.push_node("request"), Some(1));
        builder.push_edge(0, 1, Some("sends".to_string()));

        let graph = builder.finish().expect("graph");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].id, "node_1");
        assert_eq!(
            graph.to_mermaid(),
            "graph TB\n    node_0((\"Client\"))\n    node_1[\"request\"]\n    node_0 --> |\"sends\"| node_1"
        );
    }

    #[test]
    fn unlabeled_edges_use_plain_arrow() {
        let mut builder = SentenceGraphBuilder::new(Orientation::TB);
        builder.push_node("How");
        builder.push_node("does it work");
        builder.push_edge(0, 1, None);
        let graph = builder.finish().expect("graph");
        assert!(graph.to_mermaid().ends_with("    node_0 --> node_1"));
    }

    #[test]
    fn empty_builder_yields_nothing() {
        assert!(SentenceGraphBuilder::new(Orientation::TB).finish().is_none());
    }

    #[test]
    fn document_form_keeps_root_circle_and_labels() {
        let mut builder = SentenceGraphBuilder::new(Orientation::TB);
        builder.push_node("Start");
        builder.push_node("server");
        builder.push_edge(0, 1, Some("to".to_string()));
        let document = builder.finish().expect("graph").to_document();

        assert_eq!(document.nodes[0].shape.as_str(), "circle");
        assert_eq!(document.nodes[1].shape, NodeShape::Square);
        assert_eq!(document.links[0].style, LinkStyle::Arrow);
        assert_eq!(document.links[0].label.as_deref(), Some("to"));
    }
}

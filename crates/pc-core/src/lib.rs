#![forbid(unsafe_code)]

mod schema;
mod shapes;

pub use schema::flowchart_response_schema;
pub use shapes::{EXTENDED_SHAPES, NodeShape, ShapeName};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Words the flowchart grammar treats as keywords. They cannot be used as
/// bare node identifiers.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "end",
    "graph",
    "flowchart",
    "subgraph",
    "direction",
    "style",
    "linkStyle",
    "classDef",
    "class",
    "click",
    "call",
    "href",
    "default",
];

#[derive(Debug, Clone, Serialize, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("malformed graph document at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("invalid shape name `{name}`: {reason}")]
    InvalidShapeName { name: String, reason: &'static str },
}

impl From<serde_json::Error> for GraphError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed {
            message: error.to_string(),
            line: error.line(),
            column: error.column(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    TB,
    TD,
    BT,
    RL,
    LR,
}

impl Orientation {
    pub const ALL: [Self; 5] = [Self::TB, Self::TD, Self::BT, Self::RL, Self::LR];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TB => "TB",
            Self::TD => "TD",
            Self::BT => "BT",
            Self::RL => "RL",
            Self::LR => "LR",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|orientation| orientation.as_str() == raw.trim())
    }
}

/// Arrow form of a link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum LinkStyle {
    #[default]
    #[serde(rename = "-->")]
    Arrow,
    #[serde(rename = "---")]
    Open,
    #[serde(rename = "-.->")]
    Dotted,
    #[serde(rename = "==>")]
    Thick,
    #[serde(rename = "o--o")]
    CircleEnds,
    #[serde(rename = "x--x")]
    CrossEnds,
    #[serde(rename = "<-->")]
    Bidirectional,
}

impl LinkStyle {
    /// Ordered longest-first so prefix matching never picks a shorter operator.
    pub const ALL: [Self; 7] = [
        Self::Dotted,
        Self::CircleEnds,
        Self::CrossEnds,
        Self::Bidirectional,
        Self::Arrow,
        Self::Open,
        Self::Thick,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrow => "-->",
            Self::Open => "---",
            Self::Dotted => "-.->",
            Self::Thick => "==>",
            Self::CircleEnds => "o--o",
            Self::CrossEnds => "x--x",
            Self::Bidirectional => "<-->",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == raw.trim())
    }

    /// Whether the link has an arrowhead at its target.
    #[must_use]
    pub const fn is_directed(self) -> bool {
        matches!(
            self,
            Self::Arrow | Self::Dotted | Self::Thick | Self::Bidirectional
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

impl GraphNode {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source_id: String,
    pub target_id: String,
    pub style: LinkStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GraphLink {
    #[must_use]
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, style: LinkStyle) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            style,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if present and not blank.
    #[must_use]
    pub fn visible_label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Orientation plus ordered nodes and links; the renderer's input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GraphDocument {
    pub orientation: Orientation,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphDocument {
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: GraphLink) -> Self {
        self.links.push(link);
        self
    }

    /// Deserialize a document from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Malformed`] when a required field is missing or
    /// an enumerated value is unknown.
    pub fn from_json_str(input: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Deserialize a document from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`GraphDocument::from_json_str`].
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, GraphError> {
        Ok(serde_json::from_value(value)?)
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Link endpoints that do not name a declared node.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<&str> {
        let mut dangling = Vec::new();
        for link in &self.links {
            for endpoint in [link.source_id.as_str(), link.target_id.as_str()] {
                if self.find_node(endpoint).is_none() && !dangling.contains(&endpoint) {
                    dangling.push(endpoint);
                }
            }
        }
        dangling
    }
}

/// Grammatical role assigned by a phrase tagger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PhraseRole {
    NounPhrase,
    VerbPhrase,
}

impl PhraseRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NounPhrase => "noun-phrase",
            Self::VerbPhrase => "verb-phrase",
        }
    }
}

/// A contiguous substring of a sentence with its grammatical role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedSpan {
    pub role: PhraseRole,
    pub text: String,
}

impl TaggedSpan {
    #[must_use]
    pub fn noun(text: impl Into<String>) -> Self {
        Self {
            role: PhraseRole::NounPhrase,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn verb(text: impl Into<String>) -> Self {
        Self {
            role: PhraseRole::VerbPhrase,
            text: text.into(),
        }
    }
}

/// Tagger output: noun and verb phrases, each in left-to-right order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaggedSentence {
    pub nouns: Vec<TaggedSpan>,
    pub verbs: Vec<TaggedSpan>,
}

impl TaggedSentence {
    #[must_use]
    pub fn new<N, V>(nouns: N, verbs: V) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            nouns: nouns.into_iter().map(TaggedSpan::noun).collect(),
            verbs: verbs.into_iter().map(TaggedSpan::verb).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty() && self.verbs.is_empty()
    }
}

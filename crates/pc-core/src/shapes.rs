//! Node shape vocabulary.
//!
//! Mermaid's classic shapes use bracket pairs; everything else is expressed
//! with the `@{ shape: <name> }` annotation. The extended vocabulary is large
//! and grows between Mermaid releases, so names are validated by character set
//! and merely *flagged* when they are not in the known list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GraphError;

/// Extended shape names understood by Mermaid's `@{ shape: ... }` syntax,
/// including aliases.
pub const EXTENDED_SHAPES: &[&str] = &[
    "bang",
    "notch-rect",
    "card",
    "notched-rectangle",
    "cloud",
    "hourglass",
    "collate",
    "bolt",
    "com-link",
    "lightning-bolt",
    "brace",
    "brace-l",
    "comment",
    "brace-r",
    "braces",
    "lean-r",
    "in-out",
    "lean-right",
    "lean-l",
    "lean-left",
    "out-in",
    "cyl",
    "cylinder",
    "database",
    "db",
    "diam",
    "decision",
    "diamond",
    "question",
    "delay",
    "half-rounded-rectangle",
    "h-cyl",
    "das",
    "horizontal-cylinder",
    "lin-cyl",
    "disk",
    "lined-cylinder",
    "curv-trap",
    "curved-trapezoid",
    "display",
    "div-rect",
    "div-proc",
    "divided-process",
    "divided-rectangle",
    "doc",
    "document",
    "rounded",
    "event",
    "tri",
    "extract",
    "triangle",
    "fork",
    "join",
    "win-pane",
    "internal-storage",
    "window-pane",
    "f-circ",
    "filled-circle",
    "junction",
    "lin-doc",
    "lined-document",
    "lin-rect",
    "lin-proc",
    "lined-process",
    "lined-rectangle",
    "shaded-process",
    "notch-pent",
    "loop-limit",
    "notched-pentagon",
    "flip-tri",
    "flipped-triangle",
    "manual-file",
    "sl-rect",
    "manual-input",
    "sloped-rectangle",
    "trap-t",
    "inv-trapezoid",
    "manual",
    "trapezoid-top",
    "docs",
    "documents",
    "st-doc",
    "stacked-document",
    "st-rect",
    "processes",
    "procs",
    "stacked-rectangle",
    "odd",
    "flag",
    "paper-tape",
    "hex",
    "hexagon",
    "prepare",
    "trap-b",
    "priority",
    "trapezoid",
    "trapezoid-bottom",
    "rect",
    "proc",
    "process",
    "rectangle",
    "circle",
    "circ",
    "sm-circ",
    "small-circle",
    "start",
    "dbl-circ",
    "double-circle",
    "fr-circ",
    "framed-circle",
    "stop",
    "bow-rect",
    "bow-tie-rectangle",
    "stored-data",
    "fr-rect",
    "framed-rectangle",
    "subproc",
    "subprocess",
    "subroutine",
    "cross-circ",
    "crossed-circle",
    "summary",
    "tag-doc",
    "tagged-document",
    "tag-rect",
    "tag-proc",
    "tagged-process",
    "tagged-rectangle",
    "stadium",
    "pill",
    "terminal",
    "text",
];

/// A validated extended shape name.
///
/// Any lowercase ASCII kebab-case name is accepted; [`ShapeName::is_listed`]
/// tells whether it is part of [`EXTENDED_SHAPES`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeName(String);

impl ShapeName {
    /// Validate a shape name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidShapeName`] when the name is empty or
    /// contains characters other than `a-z`, `0-9` and `-`.
    pub fn parse(raw: &str) -> Result<Self, GraphError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(GraphError::InvalidShapeName {
                name: raw.to_string(),
                reason: "shape name is empty",
            });
        }
        if !name
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
        {
            return Err(GraphError::InvalidShapeName {
                name: raw.to_string(),
                reason: "only lowercase letters, digits and '-' are allowed",
            });
        }
        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name appears in the known extended vocabulary.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        EXTENDED_SHAPES.contains(&self.0.as_str())
    }
}

impl fmt::Display for ShapeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeShape {
    /// `id["label"]`
    #[default]
    Square,
    /// `id("label")`
    Round,
    /// `id{"label"}`
    Rhombus,
    /// `id["label"]@{ shape: name }`
    Named(ShapeName),
}

impl NodeShape {
    /// Parse a shape name from the wire format.
    ///
    /// # Errors
    ///
    /// Propagates [`ShapeName::parse`] failures for non-classic names.
    pub fn parse(raw: &str) -> Result<Self, GraphError> {
        match raw.trim() {
            "square" => Ok(Self::Square),
            "round" => Ok(Self::Round),
            "rhombus" => Ok(Self::Rhombus),
            other => ShapeName::parse(other).map(Self::Named),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Square => "square",
            Self::Round => "round",
            Self::Rhombus => "rhombus",
            Self::Named(name) => name.as_str(),
        }
    }

    /// Opening and closing brackets for the classic shapes.
    #[must_use]
    pub const fn brackets(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Square => Some(("[", "]")),
            Self::Round => Some(("(", ")")),
            Self::Rhombus => Some(("{", "}")),
            Self::Named(_) => None,
        }
    }
}

impl TryFrom<String> for NodeShape {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodeShape> for String {
    fn from(value: NodeShape) -> Self {
        value.as_str().to_string()
    }
}

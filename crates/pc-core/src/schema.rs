//! JSON schema handed to a model collaborator to constrain its output to the
//! [`GraphDocument`](crate::GraphDocument) wire shape.

use serde_json::{Value, json};

use crate::{LinkStyle, Orientation, shapes::EXTENDED_SHAPES};

/// Build the response schema for a flowchart graph document.
#[must_use]
pub fn flowchart_response_schema() -> Value {
    let orientations: Vec<&str> = Orientation::ALL.iter().map(|o| o.as_str()).collect();
    let mut shapes = vec!["square", "round", "rhombus"];
    shapes.extend_from_slice(EXTENDED_SHAPES);
    let styles: Vec<&str> = LinkStyle::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "orientation": {
                "type": "string",
                "enum": orientations,
                "description": "The orientation of the flowchart (e.g., Top-Bottom, Left-Right)."
            },
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "Unique alphanumeric identifier for the node."
                        },
                        "label": {
                            "type": "string",
                            "description": "Text label for the node."
                        },
                        "shape": {
                            "type": "string",
                            "enum": shapes,
                            "description": "The shape of the node. square=[], round=(), rhombus={}. other shapes use @{ shape: name } syntax."
                        }
                    },
                    "required": ["id", "label", "shape"]
                }
            },
            "links": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "sourceId": {
                            "type": "string",
                            "description": "ID of the starting node."
                        },
                        "targetId": {
                            "type": "string",
                            "description": "ID of the ending node."
                        },
                        "style": {
                            "type": "string",
                            "enum": styles,
                            "description": "The style of the arrow/link."
                        },
                        "label": {
                            "type": "string",
                            "description": "Optional text on the link."
                        }
                    },
                    "required": ["sourceId", "targetId", "style"]
                }
            }
        },
        "required": ["orientation", "nodes", "links"]
    })
}

#[cfg(test)]
mod tests {
    use super::flowchart_response_schema;

    #[test]
    fn schema_lists_every_orientation_and_style() {
        let schema = flowchart_response_schema();
        let orientations = schema["properties"]["orientation"]["enum"]
            .as_array()
            .expect("orientation enum");
        assert_eq!(orientations.len(), 5);

        let styles = schema["properties"]["links"]["items"]["properties"]["style"]["enum"]
            .as_array()
            .expect("style enum");
        assert!(styles.iter().any(|s| s == "<-->"));
        assert!(styles.iter().any(|s| s == "-.->"));
    }

    #[test]
    fn schema_starts_shape_enum_with_classic_shapes() {
        let schema = flowchart_response_schema();
        let shapes = schema["properties"]["nodes"]["items"]["properties"]["shape"]["enum"]
            .as_array()
            .expect("shape enum");
        assert_eq!(shapes[0], "square");
        assert_eq!(shapes[1], "round");
        assert_eq!(shapes[2], "rhombus");
        assert!(shapes.iter().any(|s| s == "cylinder"));
    }

    #[test]
    fn schema_marks_link_label_optional() {
        let schema = flowchart_response_schema();
        let required = schema["properties"]["links"]["items"]["required"]
            .as_array()
            .expect("required list");
        assert!(!required.iter().any(|field| field == "label"));
    }
}

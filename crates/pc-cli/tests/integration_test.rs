//! End-to-end tests for the `prosechart` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn prosechart(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prosechart"))
        .args(args)
        .env_remove("PROSECHART_MODEL_ENDPOINT")
        .env_remove("PROSECHART_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("failed to launch prosechart")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path.to_string_lossy().into_owned()
}

const START_END: &str = r#"{"orientation":"TD","nodes":[{"id":"A","label":"Start","shape":"round"},{"id":"B","label":"End","shape":"square"}],"links":[{"sourceId":"A","targetId":"B","style":"-->","label":"Go"}]}"#;

#[test]
fn parse_prints_diagram_for_inline_text() {
    let output = prosechart(&["parse", "Client sends request"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "graph TB\n    node_0((\"Client\"))\n    node_1[\"request\"]\n    node_0 --> |\"sends\"| node_1\n"
    );
}

#[test]
fn parse_honors_orientation_and_reads_files() {
    let dir = tempdir().expect("tempdir");
    let input = write(dir.path(), "sentence.txt", "Client sends request\n");
    let output = prosechart(&["parse", &input, "--orientation", "LR"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("graph LR\n    node_0((\"Client\"))"));

    let rejected = prosechart(&["parse", "x", "--orientation", "sideways"]);
    assert!(!rejected.status.success());
    assert!(stderr(&rejected).contains("unknown orientation"));
}

#[test]
fn parse_exits_nonzero_without_structure() {
    let output = prosechart(&["parse", "   "]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn parse_json_reports_method_and_confidence() {
    let output = prosechart(&["parse", "Client sends request", "--json"]);
    assert!(output.status.success());
    let report: Value = serde_json::from_str(&stdout(&output)).expect("json report");
    assert_eq!(report["found"], true);
    assert_eq!(report["method"], "noun-chain");
    assert_eq!(report["extraction"]["method"], "noun-chain");
    assert_eq!(report["extraction"]["graph"]["nodes"][1]["label"], "request");
}

#[test]
fn parse_document_feeds_render() {
    let parsed = prosechart(&["parse", "Client sends request", "--document"]);
    assert!(parsed.status.success(), "stderr: {}", stderr(&parsed));

    let dir = tempdir().expect("tempdir");
    let input = write(dir.path(), "extracted.json", &stdout(&parsed));
    let rendered = prosechart(&["render", &input]);
    assert!(rendered.status.success(), "stderr: {}", stderr(&rendered));
    assert_eq!(
        stdout(&rendered),
        "graph TB\n    node_0[\"Client\"]@{ shape: circle }\n    node_1[\"request\"]\nnode_0 --> | sends | node_1\n"
    );
}

#[test]
fn tag_lists_phrases() {
    let output = prosechart(&["tag", "Client sends request", "--json"]);
    assert!(output.status.success());
    let tagged: Value = serde_json::from_str(&stdout(&output)).expect("json tags");
    assert_eq!(tagged["nouns"][0]["text"], "Client");
    assert_eq!(tagged["verbs"][0]["text"], "sends");

    let plain = prosechart(&["tag", "Client sends request"]);
    assert!(stdout(&plain).contains("noun-phrase  Client"));
}

#[test]
fn render_writes_output_file() {
    let dir = tempdir().expect("tempdir");
    let input = write(dir.path(), "graph.json", START_END);
    let target = dir.path().join("graph.mmd");
    let target_arg = target.to_string_lossy().into_owned();

    let output = prosechart(&["render", &input, "-o", &target_arg]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert_eq!(
        fs::read_to_string(&target).expect("rendered file"),
        "graph TD\n    A(\"Start\")\n    B[\"End\"]\nA --> | Go | B\n"
    );
}

#[test]
fn render_accepts_yaml_and_bare_labels() {
    let dir = tempdir().expect("tempdir");
    let yaml = "orientation: LR\nnodes:\n  - id: a\n    label: Alpha\n    shape: round\nlinks: []\n";
    let input = write(dir.path(), "graph.yaml", yaml);
    let output = prosechart(&["render", &input, "--bare-labels"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "graph LR\n    a(Alpha)\n");
}

#[test]
fn render_rejects_malformed_documents() {
    let output = prosechart(&["render", r#"{"orientation":"TD","nodes":[{"id":"A"}],"links":[]}"#]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to decode JSON graph document"));
}

#[test]
fn convert_model_strategy_replays_recorded_response() {
    let dir = tempdir().expect("tempdir");
    let response = write(dir.path(), "response.txt", &format!("```json\n{START_END}\n```\n"));
    let output = prosechart(&[
        "convert",
        "anything at all",
        "--strategy",
        "local",
        "--model-response",
        &response,
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "graph TD\n    A(\"Start\")\n    B[\"End\"]\nA --> | Go | B\n"
    );
}

#[test]
fn convert_model_strategy_without_producer_fails() {
    let output = prosechart(&["convert", "Client sends request", "--strategy", "hosted"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no producer registered for the hosted strategy"));
}

#[test]
fn convert_rule_first_prefers_the_parser() {
    let output = prosechart(&[
        "convert",
        "Client sends request",
        "--strategy",
        "hosted",
        "--policy",
        "rule-first",
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let conversion: Value = serde_json::from_str(&stdout(&output)).expect("json conversion");
    assert_eq!(conversion["pipeline"], "rule-based");
    assert_eq!(conversion["method"], "noun-chain");
}

#[test]
fn validate_reports_errors_and_strict_warnings() {
    let valid = prosechart(&["validate", "graph TD\n    A[\"Start\"]\n    B[\"End\"]\nA --> B"]);
    assert!(valid.status.success(), "stdout: {}", stdout(&valid));
    assert!(stdout(&valid).contains("✓ Valid flowchart"));

    let invalid = prosechart(&["validate", "graph XY\nA --> B"]);
    assert_eq!(invalid.status.code(), Some(1));
    assert!(stdout(&invalid).contains("✗ Invalid flowchart"));

    let undeclared = "graph TD\nA --> B";
    assert!(prosechart(&["validate", undeclared]).status.success());
    let strict = prosechart(&["validate", undeclared, "--strict", "--json"]);
    assert_eq!(strict.status.code(), Some(1));
    let result: Value = serde_json::from_str(&stdout(&strict)).expect("json result");
    assert_eq!(result["valid"], false);
    assert_eq!(result["link_count"], 1);
}

#[test]
fn schema_lists_graph_fields() {
    let output = prosechart(&["schema"]);
    assert!(output.status.success());
    let schema: Value = serde_json::from_str(&stdout(&output)).expect("json schema");
    assert!(schema["properties"]["nodes"].is_object());
    assert_eq!(schema["required"][0], "orientation");
}

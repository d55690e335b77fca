//! Golden snapshot harness for flowchart text determinism and stability.

use pc_convert::decode_model_response;
use pc_core::GraphDocument;
use pc_parser::{SentenceParser, check_flowchart};
use pc_render::render;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

const RENDER_CASES: &[&str] = &[
    "render_basic.json",
    "render_shapes.json",
    "render_escaping.json",
    "render_yaml.yaml",
];

const SENTENCE_CASES: &[&str] = &[
    "sentence_client.txt",
    "sentence_chain.txt",
    "sentence_fmm.txt",
];

fn golden_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
}

fn normalize(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf29ce484222325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn fnv_hex(value: &str) -> String {
    format!("{:016x}", fnv1a_64(value.as_bytes()))
}

fn load_document(path: &Path) -> GraphDocument {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed reading {}: {err}", path.display()));
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") => serde_yaml::from_str(&source)
            .unwrap_or_else(|err| panic!("bad YAML in {}: {err}", path.display())),
        _ => decode_model_response(&source)
            .unwrap_or_else(|err| panic!("bad JSON in {}: {err}", path.display())),
    }
}

fn compare(case_file: &str, rendered: &str, bless: bool) {
    let base = golden_dir();
    let stem = case_file
        .split_once('.')
        .map_or(case_file, |(stem, _)| stem);
    let expected_path = base.join(format!("{stem}.mmd"));
    let rendered = normalize(rendered);

    let check = check_flowchart(&rendered);
    assert!(
        check.is_valid(),
        "golden output for {stem} fails the grammar: {:?}",
        check.diagnostics
    );

    if bless {
        fs::write(&expected_path, &rendered)
            .unwrap_or_else(|err| panic!("failed writing {}: {err}", expected_path.display()));
    }

    let expected = fs::read_to_string(&expected_path).unwrap_or_else(|err| {
        panic!(
            "missing golden snapshot {} ({err}). run with BLESS=1 to generate",
            expected_path.display()
        )
    });
    let expected = normalize(&expected);

    assert_eq!(
        fnv_hex(&rendered),
        fnv_hex(&expected),
        "FNV hash mismatch for case {stem}"
    );
    assert_eq!(rendered, expected, "golden snapshot content mismatch for case {stem}");

    let evidence = json!({
        "scenario_id": stem,
        "surface": "cli-integration",
        "node_count": check.nodes.len(),
        "link_count": check.links.len(),
        "warning_count": check.warnings().count(),
        "output_artifact_hash": fnv_hex(&rendered),
        "pass_fail_reason": if bless { "bless-updated" } else { "matched-golden" },
    });
    println!("{evidence}");
}

fn bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1")
}

#[test]
fn render_golden_snapshots_are_stable() {
    let bless = bless();
    for case_file in RENDER_CASES {
        let document = load_document(&golden_dir().join(case_file));
        let rendered = render(&document)
            .unwrap_or_else(|err| panic!("render failed for {case_file}: {err}"));
        let rerender = render(&document).expect("second render");
        assert_eq!(rendered, rerender, "determinism violation for case {case_file}");
        compare(case_file, &rendered, bless);
    }
}

#[test]
fn sentence_golden_snapshots_are_stable() {
    let bless = bless();
    let parser = SentenceParser::new();
    for case_file in SENTENCE_CASES {
        let path = golden_dir().join(case_file);
        let sentence = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed reading {}: {err}", path.display()));
        let diagram = parser
            .parse(&sentence)
            .unwrap_or_else(|| panic!("no structure found for {case_file}"));
        compare(case_file, &diagram, bless);
    }
}

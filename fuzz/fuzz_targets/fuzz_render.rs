#![no_main]

use libfuzzer_sys::fuzz_target;
use pc_core::GraphDocument;
use pc_render::render;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(document) = GraphDocument::from_json_value(value) else {
        return;
    };
    if let Ok(first) = render(&document) {
        let second = render(&document).unwrap_or_default();
        assert_eq!(first, second, "rendering is not deterministic");
    }
});

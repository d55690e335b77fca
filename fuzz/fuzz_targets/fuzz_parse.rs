#![no_main]

use libfuzzer_sys::fuzz_target;
use pc_parser::{check_flowchart, parse};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(diagram) = parse(text) {
        let check = check_flowchart(&diagram);
        assert!(check.is_valid(), "parser output rejected: {:?}", check.diagnostics);
    }
});

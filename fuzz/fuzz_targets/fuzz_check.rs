#![no_main]

use libfuzzer_sys::fuzz_target;
use pc_parser::check_flowchart;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let check = check_flowchart(&text);
    for diagnostic in &check.diagnostics {
        let _ = diagnostic.to_string();
    }
});

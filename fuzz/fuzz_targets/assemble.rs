#![no_main]

use libfuzzer_sys::fuzz_target;

use lowasm::parser::{self, text};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that assembles must decode without panicking.
    if let Ok(bytes) = text::assemble(source) {
        let _ = parser::decode(&bytes, 0);
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;

use lowasm::codegen::{emit_function, Listing};
use lowasm::parser;

fuzz_target!(|data: &[u8]| {
    // Looking for panics only; errors are expected for most inputs.
    if let Ok(body) = parser::decode(data, 2) {
        let _ = body.to_string();
        let _ = emit_function(&body, &mut Listing::new());
    }
});

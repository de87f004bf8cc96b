#![no_main]

use libfuzzer_sys::fuzz_target;
use tsxor::Decoder;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to the decoder - should never panic.
    // May return Err for malformed input, but should not crash.
    let Ok(mut it) = Decoder::new(data) else {
        return;
    };
    while it.next() {
        let _ = it.values();
    }
    let _ = it.err();
});

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let root = html::parse(text);
        // Whatever the input, the result is a single element root.
        assert!(matches!(root, html::Node::Element { .. }));
    }
});

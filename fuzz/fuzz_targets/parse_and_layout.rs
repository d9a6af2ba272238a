#![no_main]

use layout::test_support::FixedMeasurer;
use layout::Viewport;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let root = html::parse(text);
        let items = layout::layout(&root, &FixedMeasurer, Viewport::default());
        for item in &items {
            assert!(item.x.is_finite());
            assert!(item.y.is_finite());
        }
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use teachtask_core::markup::strip_markup;
use teachtask_core::suggest::parse;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let parsed = parse(text);
    assert!(!parsed.title.contains("**"));
    assert!((1..=3).contains(&parsed.priority.rank()));
    let _ = strip_markup(text);
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use literatura_core::format::{FormatArgs, Template};

fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(template) = Template::parse(pattern) else {
        return;
    };
    let _ = template.render(&FormatArgs {
        src: Some("src/"),
        dst: Some("lib/"),
        weight: Some(3),
        cni: Some("1::"),
        glyphs: Some("┌>"),
    });
});

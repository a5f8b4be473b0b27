#![no_main]

use beanscope::reflection::{namer, PropertyTokenizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    let mut segment = Some(PropertyTokenizer::new(path));
    while let Some(current) = segment {
        let _ = namer::method_to_property(current.name());
        let _ = current.index();
        segment = current.next_child();
    }
});

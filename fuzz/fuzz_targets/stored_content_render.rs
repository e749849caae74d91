#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_agent::ChatMessage;
use relay_render::{classify_stored_content, render_message, ViewMode};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let shape = classify_stored_content(&raw);
    let shape_name = shape.as_str();
    assert!(!shape_name.is_empty());

    let message = ChatMessage::assistant(raw.as_ref());
    for mode in [ViewMode::Text, ViewMode::Dashboard] {
        let html = render_message(&message, mode);
        assert!(html.contains(&format!("data-content-shape=\"{shape_name}\"")));
    }
});

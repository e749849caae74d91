#![no_main]

use libfuzzer_sys::fuzz_target;
use relay_agent::normalize_agent_reply;
use relay_render::{classify_stored_content, StoredContentShape};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let reply = normalize_agent_reply(raw);
    let Ok(content) = reply.to_content_string() else {
        return;
    };

    match classify_stored_content(&content) {
        StoredContentShape::Canonical { text, .. } => assert_eq!(text, reply.text_view),
        other => panic!("stored reply must classify as canonical, got {}", other.as_str()),
    }
});

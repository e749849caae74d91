//! Folds the agent endpoint's historical reply shapes into `NormalizedAgentReply`.
use serde_json::{Map, Value};

use crate::dashboard::DashboardContent;
use crate::types::NormalizedAgentReply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which reply shape the normalizer recognized.
pub enum ReplySource {
    /// `response` held a JSON document carrying its own `textView`.
    LegacyEmbedded,
    /// `response` held plain text; dashboard came from `module_outputs`.
    LegacyText,
    /// The body itself is the reply object.
    Direct,
}

impl ReplySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LegacyEmbedded => "legacy_embedded",
            Self::LegacyText => "legacy_text",
            Self::Direct => "direct",
        }
    }
}

pub fn normalize_agent_reply(raw: Value) -> NormalizedAgentReply {
    normalize_agent_reply_with_source(raw).0
}

pub fn normalize_agent_reply_with_source(raw: Value) -> (NormalizedAgentReply, ReplySource) {
    let mut body = match raw {
        Value::Object(body) if body.contains_key("response") => body,
        other => return (reply_from_value(other), ReplySource::Direct),
    };

    let response_text = body
        .remove("response")
        .map(|response| json_text(&response))
        .unwrap_or_default();

    if let Ok(embedded) = serde_json::from_str::<Value>(&response_text) {
        if has_field(&embedded, "textView") {
            return (reply_from_value(embedded), ReplySource::LegacyEmbedded);
        }
    }

    let dashboard_view = body
        .remove("module_outputs")
        .filter(|outputs| !outputs.is_null())
        .unwrap_or_else(|| Value::Object(Map::new()));
    (
        NormalizedAgentReply {
            text_view: response_text,
            dashboard_view: Some(dashboard_view),
            extra: Map::new(),
        },
        ReplySource::LegacyText,
    )
}

/// Best-effort dashboard decode; anything that is not an object is empty.
pub fn decode_dashboard_value(value: Value) -> DashboardContent {
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => DashboardContent::default(),
    }
}

/// Keeps the reply object untouched apart from a missing or non-string `textView`.
fn reply_from_value(value: Value) -> NormalizedAgentReply {
    let fallback_text = value.to_string();
    let Value::Object(mut object) = value else {
        return NormalizedAgentReply {
            text_view: fallback_text,
            dashboard_view: None,
            extra: Map::new(),
        };
    };

    let text_view = match object.remove("textView") {
        Some(Value::String(text)) => text,
        _ => fallback_text,
    };
    let dashboard_view = object
        .remove("dashboardView")
        .filter(|dashboard| !dashboard.is_null());

    NormalizedAgentReply {
        text_view,
        dashboard_view,
        extra: object,
    }
}

fn has_field(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|field| !field.is_null())
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

//! Stored assistant content classification.
//!
//! Assistant message content is re-read on every render. It may be the
//! canonical `{textView, dashboardView}` document, an older `{response,
//! module_outputs}` document, some other JSON, or plain text. At most two
//! levels of JSON string encoding are unwrapped.
use relay_agent::{decode_dashboard_value, DashboardContent};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
/// Public enum `StoredContentShape` in `relay-render`.
pub enum StoredContentShape {
    Canonical {
        text: String,
        dashboard: Option<DashboardContent>,
    },
    Legacy {
        text: String,
        dashboard: Option<DashboardContent>,
    },
    /// Parsed as JSON but carries neither `textView` nor `response`.
    Plain { text: String },
    Unparseable { raw: String },
}

#[derive(Debug, Clone, PartialEq)]
/// What a message renders from once its shape is known.
pub struct ResolvedContent {
    pub text: String,
    pub dashboard: Option<DashboardContent>,
    pub allow_raw_html: bool,
}

impl StoredContentShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical { .. } => "canonical",
            Self::Legacy { .. } => "legacy",
            Self::Plain { .. } => "plain",
            Self::Unparseable { .. } => "unparseable",
        }
    }

    pub fn dashboard(&self) -> Option<&DashboardContent> {
        match self {
            Self::Canonical { dashboard, .. } | Self::Legacy { dashboard, .. } => {
                dashboard.as_ref()
            }
            Self::Plain { .. } | Self::Unparseable { .. } => None,
        }
    }

    pub fn into_resolved(self) -> ResolvedContent {
        match self {
            Self::Canonical { text, dashboard } | Self::Legacy { text, dashboard } => {
                ResolvedContent {
                    text,
                    dashboard,
                    allow_raw_html: true,
                }
            }
            Self::Plain { text } => ResolvedContent {
                text,
                dashboard: None,
                allow_raw_html: false,
            },
            Self::Unparseable { raw } => ResolvedContent {
                text: raw,
                dashboard: None,
                allow_raw_html: false,
            },
        }
    }
}

pub fn classify_stored_content(content: &str) -> StoredContentShape {
    let parsed = match serde_json::from_str::<Value>(content) {
        Ok(Value::String(inner)) => serde_json::from_str::<Value>(&inner).ok(),
        Ok(value) => Some(value),
        Err(_) => {
            return StoredContentShape::Unparseable {
                raw: content.to_string(),
            }
        }
    };

    match parsed {
        Some(Value::Object(object)) => classify_object(object, content),
        _ => StoredContentShape::Plain {
            text: content.to_string(),
        },
    }
}

fn classify_object(mut object: Map<String, Value>, content: &str) -> StoredContentShape {
    if let Some(text_view) = take_non_null(&mut object, "textView") {
        return StoredContentShape::Canonical {
            text: json_text(&text_view),
            dashboard: take_non_null(&mut object, "dashboardView").map(decode_dashboard_value),
        };
    }

    let Some(response) = take_non_null(&mut object, "response") else {
        return StoredContentShape::Plain {
            text: content.to_string(),
        };
    };
    let response_text = json_text(&response);

    if let Ok(Value::Object(mut embedded)) = serde_json::from_str::<Value>(&response_text) {
        if let Some(text_view) = take_non_null(&mut embedded, "textView") {
            return StoredContentShape::Legacy {
                text: json_text(&text_view),
                dashboard: take_non_null(&mut embedded, "dashboardView")
                    .map(decode_dashboard_value),
            };
        }
    }

    StoredContentShape::Legacy {
        text: response_text,
        dashboard: take_non_null(&mut object, "module_outputs").map(decode_dashboard_value),
    }
}

fn take_non_null(object: &mut Map<String, Value>, key: &str) -> Option<Value> {
    object.remove(key).filter(|value| !value.is_null())
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::dashboard::DashboardContent;
use crate::normalize::decode_dashboard_value;

/// Text stored as the assistant reply whenever a send fails.
pub const APOLOGY_TEXT: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

/// Id reserved for the synthetic greeting shown at the top of a new session.
pub const WELCOME_MESSAGE_ID: &str = "welcome";

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `MessageSender` values.
pub enum MessageSender {
    User,
    Assistant,
}

impl MessageSender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Persisted chat message record exchanged with the session store.
pub struct ChatMessage {
    pub id: String,
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            sender: MessageSender::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            sender: MessageSender::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Synthetic greeting; never counts as a real turn.
    pub fn welcome(text: impl Into<String>) -> Self {
        Self {
            id: WELCOME_MESSAGE_ID.to_string(),
            sender: MessageSender::Assistant,
            content: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_MESSAGE_ID
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
/// Canonical agent reply: markdown text plus an optional dashboard.
///
/// The dashboard and any other fields are kept as the agent sent them; typed
/// decoding happens when the stored content is rendered.
pub struct NormalizedAgentReply {
    pub text_view: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_view: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NormalizedAgentReply {
    /// Text-only reply with an empty, present dashboard.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text_view: text.into(),
            dashboard_view: Some(Value::Object(Map::new())),
            extra: Map::new(),
        }
    }

    pub fn apology() -> Self {
        Self::text(APOLOGY_TEXT)
    }

    /// Best-effort typed view of `dashboard_view`; `None` when absent.
    pub fn dashboard(&self) -> Option<DashboardContent> {
        self.dashboard_view.clone().map(decode_dashboard_value)
    }

    /// Serialized form stored as the assistant message content.
    pub fn to_content_string(&self) -> Result<String, RelayAgentError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `RelayAgentError` values.
pub enum RelayAgentError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("invalid agent endpoint configuration: {0}")]
    InvalidConfig(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("agent endpoint returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn new_message_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let count = MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("msg-{millis}-{count}")
}

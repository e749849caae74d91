use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug)]
pub(crate) struct WebchatApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl WebchatApiError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for WebchatApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": {
                    "code": self.code,
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatSendForm {
    #[serde(default)]
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessagesResponse {
    pub(crate) session_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) in_flight: bool,
    pub(crate) messages: Vec<relay_agent::ChatMessage>,
}

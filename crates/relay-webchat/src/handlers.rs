use std::sync::Arc;

use axum::extract::{Form, Path as AxumPath, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use relay_chat::{DispatchOutcome, Notification};
use relay_render::{render_chat_page, ChatPageBanner, ChatPageContext};
use tracing::{debug, warn};

use super::{WebchatState, CHAT_PAGE_ENDPOINT};
use crate::types::{ApiMessagesResponse, ChatSendForm, WebchatApiError};

fn back_to_chat() -> Response {
    Redirect::to(CHAT_PAGE_ENDPOINT).into_response()
}

pub(super) async fn handle_chat_page(State(state): State<Arc<WebchatState>>) -> Response {
    let dispatcher = state.dispatcher();
    let session = match dispatcher.ensure_active_session() {
        Ok(session) => session,
        Err(error) => {
            warn!(error = %error, "failed to load chat session for page render");
            state.notify(Notification::error(
                "Error",
                "Failed to load the chat session. Please try again.",
            ));
            None
        }
    };
    let view_modes = match state.view_modes() {
        Ok(view_modes) => view_modes.clone(),
        Err(error) => return error.into_response(),
    };
    let banner = state.take_notification().map(|notification| ChatPageBanner {
        level: notification.level.as_str().to_string(),
        title: notification.title,
        message: notification.message,
    });

    let (session_title, messages) = match session {
        Some(session) => (Some(session.title), session.messages),
        None => (None, Vec::new()),
    };
    Html(render_chat_page(&ChatPageContext {
        session_title,
        signed_in_user: dispatcher.current_user().map(|user| user.id),
        messages,
        view_modes,
        banner,
        in_flight: dispatcher.is_in_flight(),
    }))
    .into_response()
}

pub(super) async fn handle_chat_send(
    State(state): State<Arc<WebchatState>>,
    Form(form): Form<ChatSendForm>,
) -> Response {
    let outcome = state.dispatcher().send_message(&form.message).await;
    match &outcome {
        DispatchOutcome::Skipped(reason) => {
            debug!(reason = reason.as_str(), "chat send skipped");
        }
        DispatchOutcome::Replied { source, .. } => {
            debug!(source = source.as_str(), "chat send replied");
        }
        DispatchOutcome::Aborted { .. } | DispatchOutcome::Failed { .. } => {}
    }
    if let Some(notification) = outcome.notification() {
        state.notify(notification.clone());
    }
    back_to_chat()
}

pub(super) async fn handle_message_toggle(
    State(state): State<Arc<WebchatState>>,
    AxumPath(message_id): AxumPath<String>,
) -> Response {
    match state.view_modes() {
        Ok(mut view_modes) => {
            let mode = view_modes.toggle(&message_id);
            debug!(message_id = %message_id, view_mode = mode.as_str(), "toggled view mode");
        }
        Err(error) => return error.into_response(),
    }
    back_to_chat()
}

pub(super) async fn handle_chat_clear(State(state): State<Arc<WebchatState>>) -> Response {
    if let Err(error) = state.dispatcher().clear_active_session() {
        warn!(error = %error, "failed to clear chat session");
        state.notify(Notification::error(
            "Error",
            "Failed to clear the chat. Please try again.",
        ));
    }
    match state.view_modes() {
        Ok(mut view_modes) => view_modes.clear(),
        Err(error) => return error.into_response(),
    }
    back_to_chat()
}

pub(super) async fn handle_chat_new(State(state): State<Arc<WebchatState>>) -> Response {
    if let Err(error) = state.dispatcher().start_new_session() {
        warn!(error = %error, "failed to start chat session");
        state.notify(Notification::error(
            "Error",
            "Failed to create a chat session. Please try again.",
        ));
    }
    match state.view_modes() {
        Ok(mut view_modes) => view_modes.clear(),
        Err(error) => return error.into_response(),
    }
    back_to_chat()
}

pub(super) async fn handle_api_messages(State(state): State<Arc<WebchatState>>) -> Response {
    let dispatcher = state.dispatcher();
    let session = match dispatcher.active_session() {
        Ok(session) => session,
        Err(error) => {
            return WebchatApiError::internal(format!("failed to load chat session: {error}"))
                .into_response()
        }
    };
    let (session_id, title, messages) = match session {
        Some(session) => (Some(session.id), Some(session.title), session.messages),
        None => (None, None, Vec::new()),
    };
    Json(ApiMessagesResponse {
        session_id,
        title,
        in_flight: dispatcher.is_in_flight(),
        messages,
    })
    .into_response()
}

pub(super) async fn handle_healthz() -> &'static str {
    "ok"
}

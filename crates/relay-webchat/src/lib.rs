//! Server-rendered web chat over a `ChatDispatcher`.
//!
//! Every interaction is a plain form post followed by a 303 back to the chat
//! page, so the surface works without client-side scripting. Per-message
//! view modes and the pending notification banner live in the server state.
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use relay_chat::{ChatDispatcher, Notification};
use relay_render::ViewModePreferences;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod handlers;
#[cfg(test)]
mod tests;
mod types;

use handlers::{
    handle_api_messages, handle_chat_clear, handle_chat_new, handle_chat_page, handle_chat_send,
    handle_healthz, handle_message_toggle,
};
use types::WebchatApiError;

pub const CHAT_PAGE_ENDPOINT: &str = "/";
pub const CHAT_SEND_ENDPOINT: &str = "/chat/send";
pub const CHAT_CLEAR_ENDPOINT: &str = "/chat/clear";
pub const CHAT_NEW_ENDPOINT: &str = "/chat/new";
pub const CHAT_MESSAGE_TOGGLE_ENDPOINT: &str = "/chat/messages/{message_id}/toggle";
pub const API_MESSAGES_ENDPOINT: &str = "/api/messages";
pub const HEALTHZ_ENDPOINT: &str = "/healthz";

/// Shared state behind every web chat handler.
pub struct WebchatState {
    dispatcher: Arc<ChatDispatcher>,
    view_modes: Mutex<ViewModePreferences>,
    pending_notification: Mutex<Option<Notification>>,
}

impl WebchatState {
    pub fn new(dispatcher: Arc<ChatDispatcher>) -> Self {
        Self {
            dispatcher,
            view_modes: Mutex::new(ViewModePreferences::new()),
            pending_notification: Mutex::new(None),
        }
    }

    pub fn dispatcher(&self) -> &Arc<ChatDispatcher> {
        &self.dispatcher
    }

    fn view_modes(&self) -> Result<MutexGuard<'_, ViewModePreferences>, WebchatApiError> {
        self.view_modes
            .lock()
            .map_err(|_| WebchatApiError::internal("view mode lock poisoned"))
    }

    /// Queue a banner for the next page render; a newer banner replaces an older one.
    fn notify(&self, notification: Notification) {
        match self.pending_notification.lock() {
            Ok(mut pending) => *pending = Some(notification),
            Err(_) => warn!("notification lock poisoned; dropping banner"),
        }
    }

    fn take_notification(&self) -> Option<Notification> {
        self.pending_notification
            .lock()
            .ok()
            .and_then(|mut pending| pending.take())
    }
}

pub fn build_webchat_router(state: Arc<WebchatState>) -> Router {
    Router::new()
        .route(CHAT_PAGE_ENDPOINT, get(handle_chat_page))
        .route(CHAT_SEND_ENDPOINT, post(handle_chat_send))
        .route(CHAT_CLEAR_ENDPOINT, post(handle_chat_clear))
        .route(CHAT_NEW_ENDPOINT, post(handle_chat_new))
        .route(CHAT_MESSAGE_TOGGLE_ENDPOINT, post(handle_message_toggle))
        .route(API_MESSAGES_ENDPOINT, get(handle_api_messages))
        .route(HEALTHZ_ENDPOINT, get(handle_healthz))
        .with_state(state)
}

/// Bind `bind` and serve the web chat until ctrl-c.
pub async fn run_webchat_server(bind: &str, state: Arc<WebchatState>) -> Result<()> {
    let bind_addr = bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{bind}'"))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind web chat server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound web chat address")?;
    info!(addr = %local_addr, "web chat server listening");

    let app = build_webchat_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("web chat server exited unexpectedly")?;
    info!("web chat server stopped");
    Ok(())
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use relay_agent::{
    normalize_agent_reply_with_source, AgentEndpointConfig, AgentTransport, ChatMessage,
    NormalizedAgentReply, RelayAgentError, ReplySource, APOLOGY_TEXT,
};
use relay_session::{ChatSession, ChatSessionStore, DEFAULT_SESSION_TITLE};
use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, AuthenticatedUser};
use crate::notification::Notification;

const SESSION_TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a send turned into a no-op.
pub enum SkipReason {
    EmptyInput,
    Unauthenticated,
    AlreadyInFlight,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Unauthenticated => "unauthenticated",
            Self::AlreadyInFlight => "already_in_flight",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of one `send_message` call.
pub enum DispatchOutcome {
    Skipped(SkipReason),
    /// No session could be created; nothing was persisted.
    Aborted { notification: Notification },
    Replied {
        session_id: String,
        user_message: ChatMessage,
        assistant_message: ChatMessage,
        source: ReplySource,
    },
    /// The agent call failed; the apology was stored as the reply.
    Failed {
        session_id: String,
        user_message: ChatMessage,
        assistant_message: ChatMessage,
        notification: Notification,
        error: String,
    },
}

impl DispatchOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Aborted { notification } | Self::Failed { notification, .. } => {
                Some(notification)
            }
            Self::Skipped(_) | Self::Replied { .. } => None,
        }
    }

    pub fn assistant_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Replied {
                assistant_message, ..
            }
            | Self::Failed {
                assistant_message, ..
            } => Some(assistant_message),
            Self::Skipped(_) | Self::Aborted { .. } => None,
        }
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Public struct `ChatDispatcher` used across relay components.
pub struct ChatDispatcher {
    config: AgentEndpointConfig,
    transport: Arc<dyn AgentTransport>,
    sessions: Arc<dyn ChatSessionStore>,
    auth: Arc<dyn AuthProvider>,
    welcome_text: Option<String>,
    active_session_id: Mutex<Option<String>>,
    in_flight: AtomicBool,
}

impl ChatDispatcher {
    pub fn new(
        config: AgentEndpointConfig,
        transport: Arc<dyn AgentTransport>,
        sessions: Arc<dyn ChatSessionStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            sessions,
            auth,
            welcome_text: None,
            active_session_id: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Seed every new session with a synthetic greeting.
    pub fn with_welcome_text(mut self, text: impl Into<String>) -> Self {
        self.welcome_text = Some(text.into());
        self
    }

    pub fn config(&self) -> &AgentEndpointConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<dyn ChatSessionStore> {
        &self.sessions
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn active_session_id(&self) -> Option<String> {
        self.active_session_id
            .lock()
            .ok()
            .and_then(|active| active.clone())
    }

    pub fn set_active_session(&self, session_id: Option<String>) -> Result<()> {
        let mut active = self
            .active_session_id
            .lock()
            .map_err(|_| anyhow!("active session lock poisoned"))?;
        *active = session_id;
        Ok(())
    }

    pub fn active_session(&self) -> Result<Option<ChatSession>> {
        match self.active_session_id() {
            Some(session_id) => self.sessions.load_session(&session_id),
            None => Ok(None),
        }
    }

    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.auth.current_user()
    }

    /// Active session for the signed-in user, created on first use.
    /// Returns `None` when nobody is signed in.
    pub fn ensure_active_session(&self) -> Result<Option<ChatSession>> {
        match self.auth.current_user() {
            Some(user) => self.ensure_session(&user).map(Some),
            None => Ok(None),
        }
    }

    /// Create a fresh session for the signed-in user and make it active.
    pub fn start_new_session(&self) -> Result<ChatSession> {
        let user = self
            .auth
            .current_user()
            .ok_or_else(|| anyhow!("no authenticated user"))?;
        self.create_session_for(&user)
    }

    /// Drop every message from the active session, keeping the session.
    pub fn clear_active_session(&self) -> Result<()> {
        let Some(session_id) = self.active_session_id() else {
            return Ok(());
        };
        self.sessions.clear_session(&session_id)?;
        if let Some(welcome_text) = &self.welcome_text {
            self.sessions
                .save_message(&session_id, &ChatMessage::welcome(welcome_text.clone()))?;
        }
        Ok(())
    }

    pub async fn send_message(&self, user_text: &str) -> DispatchOutcome {
        let text = user_text.trim();
        if text.is_empty() {
            return DispatchOutcome::Skipped(SkipReason::EmptyInput);
        }
        let Some(user) = self.auth.current_user() else {
            return DispatchOutcome::Skipped(SkipReason::Unauthenticated);
        };
        let Some(_in_flight) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("send skipped: a message is already in flight");
            return DispatchOutcome::Skipped(SkipReason::AlreadyInFlight);
        };

        let session = match self.ensure_session(&user) {
            Ok(session) => session,
            Err(error) => {
                warn!(error = %error, "failed to create chat session; send aborted");
                return DispatchOutcome::Aborted {
                    notification: Notification::error(
                        "Error",
                        "Failed to create a chat session. Please try again.",
                    ),
                };
            }
        };

        let user_message = ChatMessage::user(text);
        if let Err(error) = self.sessions.save_message(&session.id, &user_message) {
            warn!(session_id = %session.id, error = %error, "failed to persist user message");
        }

        if session.real_message_count() == 0 {
            let title = session_title_from(text);
            if let Err(error) = self.sessions.update_title(&session.id, &title) {
                warn!(session_id = %session.id, error = %error, "failed to update session title");
            }
        }

        match self.request_reply(text).await {
            Ok((reply, source)) => {
                let assistant_message = ChatMessage::assistant(reply);
                self.persist_assistant(&session.id, &assistant_message);
                DispatchOutcome::Replied {
                    session_id: session.id,
                    user_message,
                    assistant_message,
                    source,
                }
            }
            Err(error) => {
                warn!(
                    session_id = %session.id,
                    error = %error,
                    "agent dispatch failed; storing apology"
                );
                let apology = NormalizedAgentReply::apology()
                    .to_content_string()
                    .unwrap_or_else(|_| APOLOGY_TEXT.to_string());
                let assistant_message = ChatMessage::assistant(apology);
                self.persist_assistant(&session.id, &assistant_message);
                DispatchOutcome::Failed {
                    session_id: session.id,
                    user_message,
                    assistant_message,
                    notification: Notification::error(
                        "Error",
                        "Failed to get a response from the agent. Please try again.",
                    ),
                    error: error.to_string(),
                }
            }
        }
    }

    async fn request_reply(&self, text: &str) -> Result<(String, ReplySource), RelayAgentError> {
        let request = self.config.request_for(text);
        let raw = self.transport.send(&request).await?;
        let (reply, source) = normalize_agent_reply_with_source(raw);
        debug!(
            source = source.as_str(),
            has_dashboard = reply.dashboard_view.is_some(),
            "normalized agent reply"
        );
        Ok((reply.to_content_string()?, source))
    }

    fn persist_assistant(&self, session_id: &str, message: &ChatMessage) {
        if let Err(error) = self.sessions.save_message(session_id, message) {
            warn!(session_id = %session_id, error = %error, "failed to persist assistant message");
        }
    }

    fn ensure_session(&self, user: &AuthenticatedUser) -> Result<ChatSession> {
        if let Some(session_id) = self.active_session_id() {
            if let Some(session) = self.sessions.load_session(&session_id)? {
                return Ok(session);
            }
            debug!(session_id = %session_id, "active session vanished; creating a new one");
        }
        self.create_session_for(user)
    }

    fn create_session_for(&self, user: &AuthenticatedUser) -> Result<ChatSession> {
        let mut session = self
            .sessions
            .create_session(&user.id, DEFAULT_SESSION_TITLE)?;
        if let Some(welcome_text) = &self.welcome_text {
            let welcome = ChatMessage::welcome(welcome_text.clone());
            self.sessions.save_message(&session.id, &welcome)?;
            session.messages.push(welcome);
        }
        self.set_active_session(Some(session.id.clone()))?;
        info!(session_id = %session.id, user_id = %user.id, "created chat session");
        Ok(session)
    }
}

/// Session title derived from the first real message.
pub fn session_title_from(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SESSION_TITLE_MAX_CHARS {
        return collapsed;
    }
    let truncated = collapsed
        .chars()
        .take(SESSION_TITLE_MAX_CHARS)
        .collect::<String>();
    format!("{}...", truncated.trim_end())
}

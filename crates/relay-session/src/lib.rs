//! Chat session persistence for relay conversations.
//!
//! `ChatSessionStore` is the seam the dispatcher and the web chat surface
//! talk to. Two backends ship here: an in-memory map and a JSONL snapshot
//! file rewritten atomically on every mutation.
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use relay_agent::ChatMessage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

mod session_storage;

use session_storage::{read_session_records, write_session_records_atomic};

const SESSION_SCHEMA_VERSION: u32 = 1;
/// Title given to sessions before the first real message renames them.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ChatSession` used across relay components.
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_session_id(),
            user_id: user_id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Messages that count as conversation turns; the synthetic welcome is excluded.
    pub fn real_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| !message.is_welcome())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Listing row for a stored session.
pub struct ChatSessionSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChatSession> for ChatSessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            message_count: session.messages.len(),
            updated_at: session.updated_at,
        }
    }
}

/// Trait contract for `ChatSessionStore` behavior.
pub trait ChatSessionStore: Send + Sync {
    fn create_session(&self, user_id: &str, title: &str) -> Result<ChatSession>;
    fn load_session(&self, session_id: &str) -> Result<Option<ChatSession>>;
    fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSessionSummary>>;
    fn save_message(&self, session_id: &str, message: &ChatMessage) -> Result<()>;
    fn update_title(&self, session_id: &str, title: &str) -> Result<()>;
    /// Drops every message but keeps the session itself.
    fn clear_session(&self, session_id: &str) -> Result<()>;
    fn delete_session(&self, session_id: &str) -> Result<bool>;
}

#[derive(Debug, Default)]
/// Public struct `InMemoryChatSessionStore` used across relay components.
pub struct InMemoryChatSessionStore {
    sessions: Mutex<BTreeMap<String, ChatSession>>,
}

impl InMemoryChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> Result<MutexGuard<'_, BTreeMap<String, ChatSession>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow!("chat session store lock poisoned"))
    }
}

impl ChatSessionStore for InMemoryChatSessionStore {
    fn create_session(&self, user_id: &str, title: &str) -> Result<ChatSession> {
        let session = ChatSession::new(user_id, title);
        self.sessions()?
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn load_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions()?.get(session_id).cloned())
    }

    fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSessionSummary>> {
        Ok(summaries_for_user(&*self.sessions()?, user_id))
    }

    fn save_message(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        let mut sessions = self.sessions()?;
        push_message(&mut sessions, session_id, message)
    }

    fn update_title(&self, session_id: &str, title: &str) -> Result<()> {
        let mut sessions = self.sessions()?;
        set_title(&mut sessions, session_id, title)
    }

    fn clear_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions()?;
        clear_messages(&mut sessions, session_id)
    }

    fn delete_session(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions()?.remove(session_id).is_some())
    }
}

#[derive(Debug)]
/// Public struct `JsonlChatSessionStore` used across relay components.
pub struct JsonlChatSessionStore {
    path: PathBuf,
    sessions: Mutex<BTreeMap<String, ChatSession>>,
}

impl JsonlChatSessionStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create session directory {}", parent.display())
                })?;
            }
        }
        let sessions = read_session_records(&path)?
            .into_iter()
            .map(|session| (session.id.clone(), session))
            .collect::<BTreeMap<_, _>>();
        tracing::debug!(
            path = %path.display(),
            sessions = sessions.len(),
            "loaded chat session store"
        );

        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sessions(&self) -> Result<MutexGuard<'_, BTreeMap<String, ChatSession>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow!("chat session store lock poisoned"))
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, ChatSession>) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.sessions()?;
        let mut staged = sessions.clone();
        let outcome = apply(&mut staged)?;
        write_session_records_atomic(&self.path, staged.values())?;
        *sessions = staged;
        Ok(outcome)
    }
}

impl ChatSessionStore for JsonlChatSessionStore {
    fn create_session(&self, user_id: &str, title: &str) -> Result<ChatSession> {
        let session = ChatSession::new(user_id, title);
        self.mutate(|sessions| {
            sessions.insert(session.id.clone(), session.clone());
            Ok(())
        })?;
        Ok(session)
    }

    fn load_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions()?.get(session_id).cloned())
    }

    fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSessionSummary>> {
        Ok(summaries_for_user(&*self.sessions()?, user_id))
    }

    fn save_message(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        self.mutate(|sessions| push_message(sessions, session_id, message))
    }

    fn update_title(&self, session_id: &str, title: &str) -> Result<()> {
        self.mutate(|sessions| set_title(sessions, session_id, title))
    }

    fn clear_session(&self, session_id: &str) -> Result<()> {
        self.mutate(|sessions| clear_messages(sessions, session_id))
    }

    fn delete_session(&self, session_id: &str) -> Result<bool> {
        self.mutate(|sessions| Ok(sessions.remove(session_id).is_some()))
    }
}

fn session_mut<'a>(
    sessions: &'a mut BTreeMap<String, ChatSession>,
    session_id: &str,
) -> Result<&'a mut ChatSession> {
    sessions
        .get_mut(session_id)
        .ok_or_else(|| anyhow!("unknown chat session '{session_id}'"))
}

fn push_message(
    sessions: &mut BTreeMap<String, ChatSession>,
    session_id: &str,
    message: &ChatMessage,
) -> Result<()> {
    let session = session_mut(sessions, session_id)?;
    if session.messages.iter().any(|existing| existing.id == message.id) {
        bail!(
            "message '{}' already exists in chat session '{}'",
            message.id,
            session_id
        );
    }
    session.messages.push(message.clone());
    session.updated_at = Utc::now();
    Ok(())
}

fn set_title(
    sessions: &mut BTreeMap<String, ChatSession>,
    session_id: &str,
    title: &str,
) -> Result<()> {
    let session = session_mut(sessions, session_id)?;
    session.title = title.to_string();
    session.updated_at = Utc::now();
    Ok(())
}

fn clear_messages(sessions: &mut BTreeMap<String, ChatSession>, session_id: &str) -> Result<()> {
    let session = session_mut(sessions, session_id)?;
    session.messages.clear();
    session.updated_at = Utc::now();
    Ok(())
}

fn summaries_for_user(
    sessions: &BTreeMap<String, ChatSession>,
    user_id: &str,
) -> Vec<ChatSessionSummary> {
    let mut summaries = sessions
        .values()
        .filter(|session| session.user_id == user_id)
        .map(ChatSessionSummary::from)
        .collect::<Vec<_>>();
    summaries.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
    summaries
}

fn new_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let count = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("chat-{nanos}-{count}")
}

//! Message dispatch for relay chat.
//!
//! `ChatDispatcher` owns one user turn end to end: guard checks, session
//! bootstrap, optimistic persistence of the user message, the single agent
//! request, reply normalization, and the apology fallback.
mod auth;
mod dispatcher;
mod notification;

pub use auth::{AuthProvider, AuthenticatedUser, StaticAuthProvider};
pub use dispatcher::{session_title_from, ChatDispatcher, DispatchOutcome, SkipReason};
pub use notification::{Notification, NotificationLevel};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `AuthenticatedUser` used across relay components.
pub struct AuthenticatedUser {
    pub id: String,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Trait contract for `AuthProvider` behavior.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthenticatedUser>;
}

#[derive(Debug, Clone, Default)]
/// Auth provider pinned to one operator configured at startup.
pub struct StaticAuthProvider {
    user: Option<AuthenticatedUser>,
}

impl StaticAuthProvider {
    pub fn signed_in(user: AuthenticatedUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Blank ids mean nobody is signed in.
    pub fn from_operator(operator: Option<&str>) -> Self {
        match operator.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::signed_in(AuthenticatedUser::new(id)),
            None => Self::signed_out(),
        }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.user.clone()
    }
}

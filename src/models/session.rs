use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by the signed-in user. Gates which workflows a command
/// serves. The backend has historically sent both capitalized and lowercase
/// spellings, so both deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[serde(alias = "Parent")]
    Parent,
    #[serde(alias = "Nurse")]
    Nurse,
    #[serde(alias = "Admin")]
    Admin,
    #[serde(alias = "Manager")]
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Parent => "parent",
            UserRole::Nurse => "nurse",
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated session established once after sign-in and injected into
/// every backend call. Held only in memory; never persisted, never read from
/// ambient storage.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub token: String,
    pub role: UserRole,
    pub user_id: i64,
    pub full_name: String,
    pub established_at: NaiveDateTime,
}

impl AuthSession {
    pub fn new(token: String, role: UserRole, user_id: i64, full_name: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            token,
            role,
            user_id,
            full_name,
            established_at: chrono::Utc::now().naive_utc(),
        }
    }
}

// Manual Debug keeps the bearer token out of logs.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("session_id", &self.session_id)
            .field("token", &"[redacted]")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .field("full_name", &self.full_name)
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// Session view handed to the webview. Carries everything the shell needs to
/// render except the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub role: UserRole,
    pub user_id: i64,
    pub full_name: String,
    pub established_at: NaiveDateTime,
}

impl From<&AuthSession> for SessionInfo {
    fn from(session: &AuthSession) -> Self {
        Self {
            session_id: session.session_id,
            role: session.role,
            user_id: session.user_id,
            full_name: session.full_name.clone(),
            established_at: session.established_at,
        }
    }
}

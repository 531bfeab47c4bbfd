//! Typed errors for the school-backend API boundary.
//!
//! Every failure is classified exactly once, here, from the transport error
//! class and the HTTP status, never by inspecting rendered message text.
//! Commands serialize the result as `{kind, message}` so the shell can branch
//! on `kind` without string matching.

use serde::{Deserialize, Serialize};

use crate::config;

/// Stable failure categories carried across the IPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No session established. Caught client-side, before any network call.
    AuthRequired,
    /// The backend rejected the token (401), or the session timed out locally.
    SessionExpired,
    /// 403 from the backend.
    PermissionDenied,
    /// Client-side validation failure. Never reaches the network.
    Validation,
    /// 400 from the backend.
    BadRequest,
    /// 404 from the backend.
    NotFound,
    /// 5xx from the backend.
    Server,
    /// TCP/DNS-level failure reaching the backend.
    Connection,
    /// The request exceeded the client-side timeout.
    Timeout,
    /// Anything else: encoding, response parsing, unexpected statuses.
    Unknown,
}

/// Errors produced at the backend API boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required: no active session")]
    AuthRequired,
    #[error("Session expired")]
    SessionExpired,
    #[error("Access denied")]
    PermissionDenied,
    #[error("{0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Server error (HTTP {status})")]
    Server { status: u16, body: String },
    #[error("Cannot reach the server at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Failed to parse server response: {0}")]
    ResponseParsing(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Request failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// The serializable category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::AuthRequired => ErrorKind::AuthRequired,
            ApiError::SessionExpired => ErrorKind::SessionExpired,
            ApiError::PermissionDenied => ErrorKind::PermissionDenied,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::BadRequest(_) => ErrorKind::BadRequest,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Connection(_) => ErrorKind::Connection,
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::ResponseParsing(_) | ApiError::Internal(_) | ApiError::Transport(_) => {
                ErrorKind::Unknown
            }
        }
    }

    /// Message shown to the user. Validation and not-found errors carry their
    /// own wording; everything else maps to a fixed phrase per category.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::AuthRequired => "Authentication error: Please log in again.".to_string(),
            ApiError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::PermissionDenied => {
                "Access denied: You do not have permission to perform this action.".to_string()
            }
            ApiError::Validation(message) => message.clone(),
            ApiError::BadRequest(_) => {
                "Invalid request data. Please check your input and try again.".to_string()
            }
            ApiError::NotFound(message) => message.clone(),
            ApiError::Server { .. } => "Server error: Please try again later.".to_string(),
            ApiError::Connection(_) => {
                "Cannot connect to the server. Please check your connection and try again."
                    .to_string()
            }
            ApiError::Timeout(_) => "The request timed out. Please try again.".to_string(),
            ApiError::ResponseParsing(_) | ApiError::Internal(_) | ApiError::Transport(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether the user's path forward is signing in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, ApiError::AuthRequired | ApiError::SessionExpired)
    }
}

/// Classify a non-success HTTP status into a typed error.
pub fn classify_status(status: u16, body: String) -> ApiError {
    let detail = body_message(&body);
    match status {
        401 => ApiError::SessionExpired,
        403 => ApiError::PermissionDenied,
        400 => ApiError::BadRequest(detail.unwrap_or_else(|| "rejected by server".to_string())),
        404 => ApiError::NotFound(detail.unwrap_or_else(|| "Resource not found".to_string())),
        500..=599 => ApiError::Server { status, body },
        other => ApiError::Transport(format!("Unexpected HTTP status {other}")),
    }
}

/// Classify a reqwest transport failure into a typed error.
pub fn classify_transport(err: reqwest::Error, base_url: &str) -> ApiError {
    if err.is_connect() {
        ApiError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        ApiError::Timeout(config::REQUEST_TIMEOUT_SECS)
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Pull a human-readable message out of a JSON error body, if there is one.
/// The backend wraps errors as `{"message": …}` (Spring default) but some
/// filters emit `{"error": …}` instead.
fn body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════
// IPC error envelope
// ═══════════════════════════════════════════════════════════

/// Error envelope returned by every IPC command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Map an action failure to a generic "try again" message, keeping the
    /// kind. Auth failures keep their re-login wording so the shell can offer
    /// the login shortcut.
    pub fn for_action(err: ApiError, action: &str) -> Self {
        if err.needs_login() {
            return Self::from(err);
        }
        Self {
            kind: err.kind(),
            message: format!("Failed to {action}. Please try again."),
        }
    }
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

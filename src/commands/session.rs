//! Session lifecycle Tauri IPC commands.
//!
//! - `establish_session`: store the signed-in user's token and role
//! - `get_session_info`: current session, minus the token
//! - `check_inactivity`: expire and report an idle session
//! - `update_activity`: reset the inactivity clock on user interaction
//! - `clear_session`: sign out

use std::sync::Arc;

use tauri::State;

use crate::api::CommandError;
use crate::models::session::{AuthSession, SessionInfo, UserRole};
use crate::state::AppState;

/// Store the session the webview obtained at sign-in. Replaces any previous
/// session wholesale.
#[tauri::command]
pub fn establish_session(
    token: String,
    role: UserRole,
    user_id: i64,
    full_name: String,
    state: State<'_, Arc<AppState>>,
) -> Result<SessionInfo, CommandError> {
    if token.trim().is_empty() {
        return Err(CommandError::validation("A sign-in token is required."));
    }
    let session = AuthSession::new(token, role, user_id, full_name);
    let info = state.establish_session(session)?;
    tracing::info!(session_id = %info.session_id, role = %info.role, "Session established");
    Ok(info)
}

#[tauri::command]
pub fn get_session_info(state: State<'_, Arc<AppState>>) -> Option<SessionInfo> {
    state.session_info()
}

/// True when the session sat idle past the timeout; the session is cleared
/// as a side effect, so the shell should route to the login screen.
#[tauri::command]
pub fn check_inactivity(state: State<'_, Arc<AppState>>) -> bool {
    state.expire_if_inactive()
}

#[tauri::command]
pub fn update_activity(state: State<'_, Arc<AppState>>) {
    state.update_activity();
}

#[tauri::command]
pub fn clear_session(state: State<'_, Arc<AppState>>) -> Result<(), CommandError> {
    state.clear_session()?;
    state.clear_prescription();
    tracing::info!("Session cleared");
    Ok(())
}

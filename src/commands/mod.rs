//! Tauri IPC commands, grouped by workflow.

pub mod attachments;
pub mod medications;
pub mod review;
pub mod session;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tauri::State;

use crate::api::CommandError;
use crate::state::AppState;

/// Health check IPC command. Verifies the Rust side is alive.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

/// Backend connectivity, for the status indicator in the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatus {
    pub reachable: bool,
    pub base_url: String,
    pub summary: String,
}

/// Probe the school backend so the shell can surface connectivity problems
/// before the user runs into them mid-form. Any HTTP answer counts as
/// reachable; only transport-level failures do not.
#[tauri::command]
pub async fn check_backend_status(
    state: State<'_, Arc<AppState>>,
) -> Result<BackendStatus, CommandError> {
    let base_url = state.api().base_url().to_string();
    let reachable = state.api().probe().await;
    let summary = if reachable {
        format!("Connected to {base_url}")
    } else {
        format!("Cannot reach {base_url}. Check that the school server is running.")
    };
    Ok(BackendStatus {
        reachable,
        base_url,
        summary,
    })
}

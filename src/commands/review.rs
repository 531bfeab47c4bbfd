//! Nurse review board Tauri IPC commands.
//!
//! - `get_review_board`: one page of the board, partitioned and searchable
//! - `get_pending_count`: badge count, failures swallowed
//! - `confirm_medication_request` / `reject_medication_request`: the two
//!   review decisions, one in flight at a time
//! - `start_auto_refresh` / `stop_auto_refresh` / `focus_refresh`: staleness
//!   notifications for the mounted board

use std::sync::Arc;

use tauri::{AppHandle, Emitter, State};

use crate::api::{self, CommandError};
use crate::commands::medications::CONFIRM_GUARD_MESSAGE;
use crate::models::session::UserRole;
use crate::refresh;
use crate::review::{self, ReviewBoard, ReviewTab};
use crate::state::AppState;

/// Events the board listens on after a decision lands.
pub const CONFIRMED_EVENT: &str = "request-confirmed";
pub const REJECTED_EVENT: &str = "request-rejected";

/// Fetch the full request set and assemble the requested page of the board.
/// The fetch is flagged so scheduler ticks do not pile on top of it.
#[tauri::command]
pub async fn get_review_board(
    tab: ReviewTab,
    search: Option<String>,
    page: Option<usize>,
    state: State<'_, Arc<AppState>>,
) -> Result<ReviewBoard, CommandError> {
    let session = state.require_role(UserRole::Nurse)?;

    state.set_refresh_busy(true);
    let fetched = api::medications::fetch_all_requests(state.api(), &session).await;
    state.set_refresh_busy(false);
    let all = fetched?;

    state.update_activity();
    Ok(review::build_board(
        all,
        tab,
        search.as_deref().unwrap_or(""),
        page.unwrap_or(1),
        chrono::Local::now().naive_local(),
        state.review_in_flight(),
    ))
}

/// Pending count for the navigation badge. A failed fetch is logged and
/// reported as "no update" so a background poll never throws a banner.
#[tauri::command]
pub async fn get_pending_count(
    state: State<'_, Arc<AppState>>,
) -> Result<Option<usize>, CommandError> {
    let session = state.require_role(UserRole::Nurse)?;
    match api::medications::fetch_pending_requests(state.api(), &session).await {
        Ok(pending) => Ok(Some(pending.len())),
        Err(e) => {
            tracing::warn!(error = %e, "Pending-count refresh failed");
            Ok(None)
        }
    }
}

/// Confirm a pending request and hand back the refreshed pending tab.
#[tauri::command]
pub async fn confirm_medication_request(
    request_id: i64,
    acknowledged: bool,
    search: Option<String>,
    page: Option<usize>,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<ReviewBoard, CommandError> {
    let session = state.require_role(UserRole::Nurse)?;

    // Step 1: the webview's proof that the nurse answered the dialog.
    if !acknowledged {
        return Err(CommandError::validation(CONFIRM_GUARD_MESSAGE));
    }

    // Step 2: mark this request as the one review action in flight. The
    // guard clears the marker on every exit path.
    let guard = state.begin_review_action(request_id)?;

    // Step 3: confirm on the backend. Failures surface as a generic
    // try-again message; the typed kind still travels with it.
    api::medications::confirm_request(state.api(), &session, guard.request_id())
        .await
        .map_err(|e| CommandError::for_action(e, "confirm the request"))?;

    tracing::info!(request_id, nurse = session.user_id, "Medication request confirmed");
    if let Err(e) = app.emit(CONFIRMED_EVENT, request_id) {
        tracing::warn!(error = %e, "Failed to emit confirm event");
    }

    // Step 4: re-fetch so the board reflects the server's view, not an
    // optimistic local mutation.
    let all = api::medications::fetch_all_requests(state.api(), &session).await?;
    state.update_activity();
    Ok(review::build_board(
        all,
        ReviewTab::Pending,
        search.as_deref().unwrap_or(""),
        page.unwrap_or(1),
        chrono::Local::now().naive_local(),
        None,
    ))
}

/// Reject a pending request with the nurse's reason, then refresh the board.
#[tauri::command]
pub async fn reject_medication_request(
    request_id: i64,
    reason: String,
    acknowledged: bool,
    search: Option<String>,
    page: Option<usize>,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<ReviewBoard, CommandError> {
    let session = state.require_role(UserRole::Nurse)?;
    if !acknowledged {
        return Err(CommandError::validation(CONFIRM_GUARD_MESSAGE));
    }
    if reason.trim().is_empty() {
        return Err(CommandError::validation(
            "A reason is required to reject a request.",
        ));
    }

    let guard = state.begin_review_action(request_id)?;
    api::medications::unconfirm_request(state.api(), &session, guard.request_id(), reason.trim())
        .await
        .map_err(|e| CommandError::for_action(e, "reject the request"))?;

    tracing::info!(request_id, nurse = session.user_id, "Medication request rejected");
    if let Err(e) = app.emit(REJECTED_EVENT, request_id) {
        tracing::warn!(error = %e, "Failed to emit reject event");
    }

    let all = api::medications::fetch_all_requests(state.api(), &session).await?;
    state.update_activity();
    Ok(review::build_board(
        all,
        ReviewTab::Pending,
        search.as_deref().unwrap_or(""),
        page.unwrap_or(1),
        chrono::Local::now().naive_local(),
        None,
    ))
}

// ═══════════════════════════════════════════════════════════
// Staleness notifications
// ═══════════════════════════════════════════════════════════

/// Start the interval scheduler for the mounted board. Idempotent: a second
/// call while one is running leaves the existing scheduler in place.
#[tauri::command]
pub async fn start_auto_refresh(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> Result<(), CommandError> {
    state.require_role(UserRole::Nurse)?;
    let mut slot = state.refresh.lock().await;
    if slot.is_none() {
        *slot = Some(refresh::start_refresh_scheduler(app));
    }
    Ok(())
}

/// Stop and abort the scheduler. Runs on unmount and on sign-out, so it is
/// not role-gated.
#[tauri::command]
pub async fn stop_auto_refresh(state: State<'_, Arc<AppState>>) -> Result<(), CommandError> {
    let mut slot = state.refresh.lock().await;
    if let Some(handle) = slot.take() {
        handle.shutdown();
        tracing::info!("Review auto-refresh torn down");
    }
    Ok(())
}

/// The window regained focus: nudge the board through the same staleness
/// path the scheduler uses.
#[tauri::command]
pub fn focus_refresh(app: AppHandle) {
    refresh::notify_stale(&app);
}

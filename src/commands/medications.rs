//! Parent-side medication request Tauri IPC commands.
//!
//! - `get_my_requests`: the signed-in parent's list with per-row action flags
//! - `submit_medication_request` / `update_medication_request`: validate and send
//! - `delete_medication_request`: remove a pending request, after confirmation
//! - `get_student_history` / `find_student_by_code`: student lookups
//! - `pick_prescription_file` / `attach_prescription_file` / `clear_prescription_file`:
//!   both attachment entry paths, converging on the same vetting
//! - `modal_opened` / `modal_closed`: scroll-lock bookkeeping for the form modal

use std::path::Path;
use std::sync::Arc;

use tauri::{AppHandle, Emitter, State};
use tauri_plugin_dialog::DialogExt;

use crate::api::{self, CommandError, ErrorKind};
use crate::models::medication::MedicationRequest;
use crate::models::session::UserRole;
use crate::models::student::Student;
use crate::review::{self, MyRequestsView};
use crate::state::AppState;
use crate::submission::{self, RequestForm, SubmissionOutcome};
use crate::upload::PrescriptionFile;

/// Event the parent list listens on to re-fetch after a change.
pub const LIST_CHANGED_EVENT: &str = "my-requests-changed";

pub(crate) const CONFIRM_GUARD_MESSAGE: &str =
    "Confirmation is required before this action can run.";

#[tauri::command]
pub async fn get_my_requests(
    state: State<'_, Arc<AppState>>,
) -> Result<MyRequestsView, CommandError> {
    let session = state.require_role(UserRole::Parent)?;
    let requests = api::medications::fetch_my_requests(state.api(), &session).await?;
    state.update_activity();
    Ok(review::build_my_requests(requests))
}

/// Validate the draft and send it, with the held attachment when one passed
/// vetting. Nothing is sent when validation fails. On success the held
/// attachment is released and the parent list is told to refresh.
#[tauri::command]
pub async fn submit_medication_request(
    form: RequestForm,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<SubmissionOutcome, CommandError> {
    let session = state.require_role(UserRole::Parent)?;
    let payload = submission::validate(&form)?;
    let attachment = state.prescription_file();

    let request = api::medications::create_request(
        state.api(),
        &session,
        &payload,
        attachment.as_ref(),
    )
    .await?;

    state.clear_prescription();
    state.update_activity();
    notify_list_changed(&app);
    tracing::info!(
        request_id = request.request_id,
        student_id = payload.student.student_id,
        with_attachment = attachment.is_some(),
        "Medication request submitted"
    );
    Ok(submission::success_outcome(request))
}

/// Same draft pipeline as submit, addressed at an existing pending request.
#[tauri::command]
pub async fn update_medication_request(
    request_id: i64,
    form: RequestForm,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<SubmissionOutcome, CommandError> {
    let session = state.require_role(UserRole::Parent)?;
    let payload = submission::validate(&form)?;
    let attachment = state.prescription_file();

    let request = api::medications::update_request(
        state.api(),
        &session,
        request_id,
        &payload,
        attachment.as_ref(),
    )
    .await?;

    state.clear_prescription();
    state.update_activity();
    notify_list_changed(&app);
    tracing::info!(request_id, "Medication request updated");
    Ok(submission::updated_outcome(request))
}

/// Delete a pending request. `acknowledged` is the webview's proof that the
/// user answered the confirmation dialog; without it nothing happens.
#[tauri::command]
pub async fn delete_medication_request(
    request_id: i64,
    acknowledged: bool,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<MyRequestsView, CommandError> {
    let session = state.require_role(UserRole::Parent)?;
    if !acknowledged {
        return Err(CommandError::validation(CONFIRM_GUARD_MESSAGE));
    }

    api::medications::delete_request(state.api(), &session, request_id)
        .await
        .map_err(|e| CommandError::for_action(e, "delete the request"))?;

    let requests = api::medications::fetch_my_requests(state.api(), &session).await?;
    state.update_activity();
    notify_list_changed(&app);
    tracing::info!(request_id, "Medication request deleted");
    Ok(review::build_my_requests(requests))
}

/// Full medication history for one student. Available to any signed-in role.
#[tauri::command]
pub async fn get_student_history(
    student_id: i64,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<MedicationRequest>, CommandError> {
    let session = state.require_session()?;
    let history = api::medications::fetch_student_history(state.api(), &session, student_id).await?;
    state.update_activity();
    Ok(history)
}

/// Look a student up by their school-issued code, for the submission form.
#[tauri::command]
pub async fn find_student_by_code(
    code: String,
    state: State<'_, Arc<AppState>>,
) -> Result<Student, CommandError> {
    let session = state.require_session()?;
    let student = api::students::find_student_by_code(state.api(), &session, &code).await?;
    state.update_activity();
    Ok(student)
}

// ═══════════════════════════════════════════════════════════
// Attachments
// ═══════════════════════════════════════════════════════════

/// Open the native picker pre-filtered to the accepted formats. The picked
/// file still goes through the same vetting as a dropped one; cancelling the
/// picker is not an error.
#[tauri::command]
pub fn pick_prescription_file(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> Result<Option<PrescriptionFile>, CommandError> {
    state.require_session()?;
    let Some(picked) = app
        .dialog()
        .file()
        .add_filter("Prescriptions", &["pdf", "jpg", "jpeg", "png"])
        .blocking_pick_file()
    else {
        return Ok(None);
    };
    let path = picked.into_path().map_err(|e| CommandError {
        kind: ErrorKind::Unknown,
        message: format!("Could not read the selected file: {e}"),
    })?;
    let file = state.attach_prescription(&path, None)?;
    state.update_activity();
    tracing::info!(file = %file.file_name, size_bytes = file.size_bytes, "Prescription attached");
    Ok(Some(file))
}

/// Vet a dropped file. A rejection clears any previously held attachment, so
/// the form never submits a file that failed its last check.
#[tauri::command]
pub fn attach_prescription_file(
    path: String,
    declared_type: Option<String>,
    state: State<'_, Arc<AppState>>,
) -> Result<PrescriptionFile, CommandError> {
    state.require_session()?;
    let file = state.attach_prescription(Path::new(&path), declared_type.as_deref())?;
    state.update_activity();
    tracing::info!(file = %file.file_name, size_bytes = file.size_bytes, "Prescription attached");
    Ok(file)
}

#[tauri::command]
pub fn clear_prescription_file(state: State<'_, Arc<AppState>>) {
    state.clear_prescription();
}

// ═══════════════════════════════════════════════════════════
// Modal scroll lock
// ═══════════════════════════════════════════════════════════

/// Take a scroll lock for an opening modal. Returns whether background
/// scrolling is currently locked.
#[tauri::command]
pub fn modal_opened(state: State<'_, Arc<AppState>>) -> bool {
    state.lock_scroll()
}

/// Release one scroll lock. Runs on every close path, submit or abandon, so
/// scrolling always comes back. When the last modal closes, the attachment
/// slot is released with it.
#[tauri::command]
pub fn modal_closed(state: State<'_, Arc<AppState>>) -> bool {
    let still_locked = state.unlock_scroll();
    if !still_locked {
        state.clear_prescription();
    }
    still_locked
}

fn notify_list_changed(app: &AppHandle) {
    if let Err(e) = app.emit(LIST_CHANGED_EVENT, ()) {
        tracing::warn!(error = %e, "Failed to emit list-changed event");
    }
}

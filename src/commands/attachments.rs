//! Prescription viewing Tauri IPC commands.
//!
//! - `view_prescription`: open a stored attachment reference, URL or legacy

use std::sync::Arc;

use tauri::{AppHandle, State};
use tauri_plugin_shell::ShellExt;

use crate::api::{CommandError, ErrorKind};
use crate::attachments::{self, AttachmentRef, AttachmentView};
use crate::state::AppState;

/// Open a request's stored attachment reference. Absolute URLs go straight
/// to the system browser; legacy filenames are fetched through the
/// authenticated endpoint and returned inline for the webview to display.
#[tauri::command]
pub async fn view_prescription(
    reference: String,
    state: State<'_, Arc<AppState>>,
    app: AppHandle,
) -> Result<AttachmentView, CommandError> {
    let session = state.require_session()?;

    match attachments::resolve_reference(&reference) {
        AttachmentRef::Url(url) => {
            app.shell().open(&url, None).map_err(|e| {
                tracing::warn!(error = %e, "Failed to open attachment URL");
                CommandError {
                    kind: ErrorKind::Unknown,
                    message: "Failed to open the attachment link. Please try again.".into(),
                }
            })?;
            state.update_activity();
            Ok(AttachmentView::ExternalUrl { url })
        }
        AttachmentRef::LegacyFile(file_name) => {
            let view = attachments::load_preview(state.api(), &session, &file_name).await?;
            state.update_activity();
            tracing::info!(file = %file_name, "Legacy prescription fetched for preview");
            Ok(view)
        }
    }
}

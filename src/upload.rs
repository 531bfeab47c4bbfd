//! Prescription attachment vetting.
//!
//! Every path that attaches a file (native picker, drag-and-drop) lands
//! here, so the rules are identical regardless of entry method: PDF, JPEG,
//! or PNG only, checked by both declared media type and filename extension,
//! at most 5 MiB.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// Accepted media types. `image/jpg` is not a registered type but shows up
/// in drag payloads from some webviews, so it is tolerated.
pub const ALLOWED_MEDIA_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Accepted filename extensions, lowercase without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Attachment size cap: 5 MiB.
pub const MAX_PRESCRIPTION_BYTES: u64 = 5 * 1024 * 1024;

/// A vetted prescription attachment, ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub media_type: String,
}

/// Vet a candidate attachment against the format and size rules.
///
/// `declared_type` is the media type reported by the source (drag payloads
/// carry one); when absent it is guessed from the filename. Both the type
/// and the extension must be on the allow-list.
pub fn vet_prescription(
    path: &Path,
    declared_type: Option<&str>,
) -> Result<PrescriptionFile, ApiError> {
    let file_name =
        sanitize_filename(path.file_name().and_then(|n| n.to_str()).unwrap_or("attachment"));

    let media_type = declared_type
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
    if !ALLOWED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(ApiError::Validation(format!(
            "Cannot attach '{file_name}': '{media_type}' is not an accepted format. \
             Upload a PDF, JPEG, or PNG file."
        )));
    }

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext) => {}
        Some(ext) => {
            return Err(ApiError::Validation(format!(
                "Cannot attach '{file_name}': '.{ext}' files are not accepted. \
                 Upload a PDF, JPEG, or PNG file."
            )));
        }
        None => {
            return Err(ApiError::Validation(format!(
                "Cannot attach '{file_name}': the file has no extension. \
                 Upload a PDF, JPEG, or PNG file."
            )));
        }
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| ApiError::Validation(format!("Cannot read '{file_name}': {e}")))?;
    let size_bytes = metadata.len();
    if size_bytes > MAX_PRESCRIPTION_BYTES {
        return Err(ApiError::Validation(format!(
            "Cannot attach '{file_name}': file is {:.2} MiB, the limit is 5 MiB.",
            mib(size_bytes)
        )));
    }

    Ok(PrescriptionFile {
        path: path.to_path_buf(),
        file_name,
        size_bytes,
        media_type,
    })
}

/// Size in binary megabytes, for user-facing messages.
pub fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Strip path components and characters that could escape the upload
/// directory from a user-supplied filename.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment");
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && *c != '\0')
        .take(255)
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

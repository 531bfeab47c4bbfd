//! Prescription attachment viewing.
//!
//! The `prescriptionFile` field on a request is either an absolute URL
//! (current uploads) or a bare filename (legacy records). URLs open in the
//! system browser as-is; legacy names are fetched through the authenticated
//! prescription endpoint and handed to the webview as an in-memory payload.
//! The payload is not retained on this side after the command returns.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::api::{medications, ApiClient, ApiError};
use crate::models::session::AuthSession;
use crate::upload;

/// How a stored attachment reference should be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentRef {
    Url(String),
    LegacyFile(String),
}

/// Decide how to open a stored reference. Anything that is not an absolute
/// http(s) URL is treated as a legacy filename and sanitized before it is
/// interpolated into the download path.
pub fn resolve_reference(raw: &str) -> AttachmentRef {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        AttachmentRef::Url(trimmed.to_string())
    } else {
        AttachmentRef::LegacyFile(upload::sanitize_filename(trimmed))
    }
}

/// Attachment resolution result handed to the webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AttachmentView {
    /// Absolute URL, already opened in the system browser.
    #[serde(rename_all = "camelCase")]
    ExternalUrl { url: String },
    /// Legacy file fetched through the backend; `data` is base64.
    #[serde(rename_all = "camelCase")]
    InlinePreview {
        file_name: String,
        media_type: String,
        size_bytes: usize,
        data: String,
    },
}

/// Fetch a legacy prescription and package it for inline display.
pub async fn load_preview(
    api: &ApiClient,
    session: &AuthSession,
    file_name: &str,
) -> Result<AttachmentView, ApiError> {
    let (bytes, media_type) = medications::download_prescription(api, session, file_name).await?;
    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(AttachmentView::InlinePreview {
        file_name: file_name.to_string(),
        media_type,
        size_bytes: bytes.len(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_resolve_as_urls() {
        assert_eq!(
            resolve_reference("https://files.example.org/rx/123.pdf"),
            AttachmentRef::Url("https://files.example.org/rx/123.pdf".into())
        );
        assert_eq!(
            resolve_reference("  http://files.example.org/a.png  "),
            AttachmentRef::Url("http://files.example.org/a.png".into())
        );
    }

    #[test]
    fn bare_names_resolve_as_legacy_files() {
        assert_eq!(
            resolve_reference("prescription_123.pdf"),
            AttachmentRef::LegacyFile("prescription_123.pdf".into())
        );
    }

    #[test]
    fn legacy_names_are_sanitized() {
        assert_eq!(
            resolve_reference("../../etc/secret.pdf"),
            AttachmentRef::LegacyFile("secret.pdf".into())
        );
    }

    #[test]
    fn preview_serializes_with_a_kind_tag() {
        let view = AttachmentView::InlinePreview {
            file_name: "rx.pdf".into(),
            media_type: "application/pdf".into(),
            size_bytes: 4,
            data: base64::engine::general_purpose::STANDARD.encode(b"%PDF"),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"kind\":\"inlinePreview\""));
        assert!(json.contains("\"fileName\":\"rx.pdf\""));
        assert!(json.contains("\"sizeBytes\":4"));

        let url = AttachmentView::ExternalUrl {
            url: "https://files.example.org/rx.pdf".into(),
        };
        let json = serde_json::to_string(&url).unwrap();
        assert!(json.contains("\"kind\":\"externalUrl\""));
    }
}

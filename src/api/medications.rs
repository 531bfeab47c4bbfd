//! Medication request endpoints.
//!
//! Thin wrappers over [`ApiClient`]: one function per backend operation,
//! each taking the caller's session explicitly. Create and update send
//! multipart bodies with a `medicationRequest` JSON part and an optional
//! `prescriptionFile` binary part.

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};

use crate::api::{error, parse_json, ApiClient, ApiError};
use crate::models::medication::{MedicationRequest, MedicationRequestPayload};
use crate::models::session::AuthSession;
use crate::upload::PrescriptionFile;

/// Cap on attachment downloads for in-app preview: 20 MiB.
pub const MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Requests submitted by the signed-in parent.
pub async fn fetch_my_requests(
    api: &ApiClient,
    session: &AuthSession,
) -> Result<Vec<MedicationRequest>, ApiError> {
    let response = api.send_checked(api.get("/medications/my", session)).await?;
    parse_json(response).await
}

/// Every request in the system, confirmed and pending alike. The review
/// board partitions this set client-side so the tab counts always agree.
pub async fn fetch_all_requests(
    api: &ApiClient,
    session: &AuthSession,
) -> Result<Vec<MedicationRequest>, ApiError> {
    let response = api.send_checked(api.get("/medications/nurse/all", session)).await?;
    parse_json(response).await
}

/// Pending requests only, used for the badge count.
pub async fn fetch_pending_requests(
    api: &ApiClient,
    session: &AuthSession,
) -> Result<Vec<MedicationRequest>, ApiError> {
    let response = api
        .send_checked(api.get("/medications/nurse/pending", session))
        .await?;
    parse_json(response).await
}

/// Full medication history for one student.
pub async fn fetch_student_history(
    api: &ApiClient,
    session: &AuthSession,
    student_id: i64,
) -> Result<Vec<MedicationRequest>, ApiError> {
    let path = format!("/medications/student/{student_id}/history");
    let response = api.send_checked(api.get(&path, session)).await?;
    parse_json(response).await
}

/// Submit a new request, with the vetted attachment when one is held.
pub async fn create_request(
    api: &ApiClient,
    session: &AuthSession,
    payload: &MedicationRequestPayload,
    attachment: Option<&PrescriptionFile>,
) -> Result<MedicationRequest, ApiError> {
    let form = multipart_form(payload, attachment).await?;
    let response = api
        .send_checked(api.post("/medications", session).multipart(form))
        .await?;
    parse_json(response).await
}

/// Replace an existing request's fields, and optionally its attachment.
pub async fn update_request(
    api: &ApiClient,
    session: &AuthSession,
    request_id: i64,
    payload: &MedicationRequestPayload,
    attachment: Option<&PrescriptionFile>,
) -> Result<MedicationRequest, ApiError> {
    let form = multipart_form(payload, attachment).await?;
    let path = format!("/medications/{request_id}");
    let response = api
        .send_checked(api.put(&path, session).multipart(form))
        .await?;
    parse_json(response).await
}

/// Delete a pending request.
pub async fn delete_request(
    api: &ApiClient,
    session: &AuthSession,
    request_id: i64,
) -> Result<(), ApiError> {
    let path = format!("/medications/{request_id}");
    api.send_checked(api.delete(&path, session)).await?;
    Ok(())
}

/// Confirm a pending request. The caller re-fetches afterwards; the response
/// body is not relied on.
pub async fn confirm_request(
    api: &ApiClient,
    session: &AuthSession,
    request_id: i64,
) -> Result<(), ApiError> {
    let path = format!("/medications/nurse/confirm/{request_id}");
    api.send_checked(api.put(&path, session)).await?;
    Ok(())
}

/// Reject a pending request, recording the nurse's reason.
pub async fn unconfirm_request(
    api: &ApiClient,
    session: &AuthSession,
    request_id: i64,
    reason: &str,
) -> Result<(), ApiError> {
    let path = format!("/medications/nurse/unconfirm/{request_id}");
    let body = serde_json::json!({ "reason": reason });
    api.send_checked(api.put(&path, session).json(&body)).await?;
    Ok(())
}

/// Download a legacy prescription file through the authenticated endpoint.
/// Returns the bytes and the media type the server reported (guessed from
/// the filename when the header is missing).
pub async fn download_prescription(
    api: &ApiClient,
    session: &AuthSession,
    file_name: &str,
) -> Result<(Vec<u8>, String), ApiError> {
    let path = format!("/medications/prescription/{file_name}");
    let response = api.send_checked(api.get(&path, session)).await?;

    let media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

    let mut stream = response.bytes_stream();
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| error::classify_transport(e, api.base_url()))?;
        if (bytes.len() + chunk.len()) as u64 > MAX_DOWNLOAD_BYTES {
            return Err(ApiError::Validation(format!(
                "'{file_name}' is too large to preview (over 20 MiB)."
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok((bytes, media_type))
}

async fn multipart_form(
    payload: &MedicationRequestPayload,
    attachment: Option<&PrescriptionFile>,
) -> Result<Form, ApiError> {
    let json = serde_json::to_string(payload)
        .map_err(|e| ApiError::Internal(format!("encode request payload: {e}")))?;
    let json_part = Part::text(json)
        .mime_str("application/json")
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut form = Form::new().part("medicationRequest", json_part);

    if let Some(file) = attachment {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| ApiError::Internal(format!("read attachment: {e}")))?;
        let file_part = Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        form = form.part("prescriptionFile", file_part);
    }
    Ok(form)
}

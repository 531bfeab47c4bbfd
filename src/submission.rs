//! Medication request submission: form validation and wire shaping.
//!
//! Validation is fail-fast and entirely client-side. The first rule that
//! trips produces the only error, and nothing is sent until a draft passes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::models::medication::{MedicationRequest, MedicationRequestPayload, StudentRef};
use crate::upload::{self, PrescriptionFile};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const INVALID_STUDENT_MESSAGE: &str = "Please select a valid student.";
pub const INVALID_QUANTITY_MESSAGE: &str = "Total quantity must be a valid number.";

/// How long the success notification stays up before auto-dismissing.
pub const SUCCESS_DISMISS_SECS: u64 = 4;

/// Raw form fields as the shell holds them. Everything is a string until
/// validation coerces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestForm {
    pub student_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub total_quantity: String,
    pub morning_quantity: String,
    pub noon_quantity: String,
    pub evening_quantity: String,
}

impl RequestForm {
    /// Pre-populate a draft from an existing request, for editing.
    pub fn from_request(request: &MedicationRequest) -> Self {
        Self {
            student_id: request.student_id.to_string(),
            medication_name: request.medication_name.clone(),
            dosage: request.dosage.clone(),
            frequency: request.frequency.clone(),
            total_quantity: request
                .total_quantity
                .map(|n| n.to_string())
                .unwrap_or_default(),
            morning_quantity: request.morning_quantity.clone().unwrap_or_default(),
            noon_quantity: request.noon_quantity.clone().unwrap_or_default(),
            evening_quantity: request.evening_quantity.clone().unwrap_or_default(),
        }
    }
}

/// Validate a draft and shape it for the wire.
///
/// Required fields are checked as a group first; then the student id and the
/// total quantity are coerced to numbers. Optional fields left blank are
/// dropped rather than sent as empty strings.
pub fn validate(form: &RequestForm) -> Result<MedicationRequestPayload, ApiError> {
    let student_id_raw = form.student_id.trim();
    if student_id_raw.is_empty()
        || form.medication_name.trim().is_empty()
        || form.dosage.trim().is_empty()
        || form.frequency.trim().is_empty()
    {
        return Err(ApiError::Validation(REQUIRED_FIELDS_MESSAGE.into()));
    }

    let student_id = match student_id_raw.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(ApiError::Validation(INVALID_STUDENT_MESSAGE.into())),
    };

    let total_quantity = match form.total_quantity.trim() {
        "" => None,
        raw => match raw.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => return Err(ApiError::Validation(INVALID_QUANTITY_MESSAGE.into())),
        },
    };

    Ok(MedicationRequestPayload {
        student: StudentRef { student_id },
        medication_name: form.medication_name.trim().to_string(),
        dosage: form.dosage.trim().to_string(),
        frequency: form.frequency.trim().to_string(),
        total_quantity,
        morning_quantity: optional(&form.morning_quantity),
        noon_quantity: optional(&form.noon_quantity),
        evening_quantity: optional(&form.evening_quantity),
    })
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ═══════════════════════════════════════════════════════════
// Submission outcome
// ═══════════════════════════════════════════════════════════

/// Transient notification the shell renders and auto-dismisses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub message: String,
    pub dismiss_after_secs: u64,
}

/// Everything the shell does after a successful create or update: reset the
/// form, show the notification, tell the parent list to refresh, close the
/// modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub request: MedicationRequest,
    pub notification: Notice,
    pub reset_form: bool,
    pub refresh_parent: bool,
    pub close_modal: bool,
}

pub fn success_outcome(request: MedicationRequest) -> SubmissionOutcome {
    outcome(request, "Medication request submitted successfully")
}

pub fn updated_outcome(request: MedicationRequest) -> SubmissionOutcome {
    outcome(request, "Medication request updated successfully")
}

fn outcome(request: MedicationRequest, message: &str) -> SubmissionOutcome {
    SubmissionOutcome {
        request,
        notification: Notice {
            message: message.to_string(),
            dismiss_after_secs: SUCCESS_DISMISS_SECS,
        },
        reset_form: true,
        refresh_parent: true,
        close_modal: true,
    }
}

// ═══════════════════════════════════════════════════════════
// Attachment slot
// ═══════════════════════════════════════════════════════════

/// Holds the vetted attachment for the open form.
///
/// A failed vetting clears any previously held file as well as recording the
/// new error, so re-selecting the same name re-runs the check from scratch.
/// An accepted file clears any prior error.
#[derive(Debug, Default)]
pub struct AttachmentSlot {
    file: Option<PrescriptionFile>,
    error: Option<String>,
}

impl AttachmentSlot {
    pub fn attach(
        &mut self,
        path: &Path,
        declared_type: Option<&str>,
    ) -> Result<PrescriptionFile, ApiError> {
        match upload::vet_prescription(path, declared_type) {
            Ok(file) => {
                self.error = None;
                self.file = Some(file.clone());
                Ok(file)
            }
            Err(err) => {
                self.file = None;
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.error = None;
    }

    pub fn file(&self) -> Option<&PrescriptionFile> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

//! Student lookup endpoints.

use crate::api::{parse_json, ApiClient, ApiError};
use crate::models::session::AuthSession;
use crate::models::student::Student;

/// Look a student up by their school-issued code. An unknown code maps to a
/// not-found error with fixed wording, so the form can show it inline.
pub async fn find_student_by_code(
    api: &ApiClient,
    session: &AuthSession,
    code: &str,
) -> Result<Student, ApiError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ApiError::Validation("Please enter a student code.".into()));
    }
    let path = format!("/students/code/{code}");
    match api.send_checked(api.get(&path, session)).await {
        Ok(response) => parse_json(response).await,
        Err(ApiError::NotFound(_)) => Err(ApiError::NotFound("Student not found".into())),
        Err(other) => Err(other),
    }
}

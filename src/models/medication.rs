use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// One parent-submitted medication order for one student, as the backend
/// returns it.
///
/// The confirmation flag has appeared under three names across backend
/// versions (`isConfirmed`, `confirmed`, `is_confirmed`). They are synonyms:
/// all of them deserialize into [`is_confirmed`](Self::is_confirmed), and
/// serialization always emits the canonical `isConfirmed`. A missing or null
/// flag reads as unconfirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub request_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_class: Option<String>,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub parent_email: Option<String>,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub total_quantity: Option<i64>,
    #[serde(default)]
    pub morning_quantity: Option<String>,
    #[serde(default)]
    pub noon_quantity: Option<String>,
    #[serde(default)]
    pub evening_quantity: Option<String>,
    /// Absolute URL for current uploads, bare filename for legacy records.
    #[serde(default)]
    pub prescription_file: Option<String>,
    #[serde(
        default,
        alias = "confirmed",
        alias = "is_confirmed",
        deserialize_with = "confirmation_flag"
    )]
    pub is_confirmed: bool,
    #[serde(default)]
    pub confirmed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    /// Reason recorded when a nurse rejects the request.
    #[serde(default)]
    pub unconfirm_reason: Option<String>,
}

impl MedicationRequest {
    pub fn is_pending(&self) -> bool {
        !self.is_confirmed
    }
}

fn confirmation_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Student reference nested inside the create/update payload, matching the
/// `{"student": {"studentId": …}}` shape the backend binds to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub student_id: i64,
}

/// Wire shape of the `medicationRequest` JSON part for create and update.
/// Optional fields left empty on the form are omitted entirely rather than
/// sent as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequestPayload {
    pub student: StudentRef,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning_quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noon_quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening_quantity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row(confirm_field: &str, confirm_value: &str) -> String {
        format!(
            r#"{{
                "requestId": 7,
                "studentId": 12,
                "studentName": "Mia Torres",
                "medicationName": "Cetirizine",
                "dosage": "5mg",
                "frequency": "Once daily",
                {confirm_field}: {confirm_value},
                "createdAt": "2025-03-01T08:30:00"
            }}"#
        )
    }

    #[test]
    fn confirmation_flag_synonyms_all_parse() {
        for field in ["\"isConfirmed\"", "\"confirmed\"", "\"is_confirmed\""] {
            let row: MedicationRequest =
                serde_json::from_str(&base_row(field, "true")).unwrap();
            assert!(row.is_confirmed, "field {field} should read as confirmed");
        }
    }

    #[test]
    fn missing_confirmation_flag_reads_as_pending() {
        let json = r#"{
            "requestId": 7,
            "studentId": 12,
            "medicationName": "Cetirizine",
            "dosage": "5mg",
            "frequency": "Once daily",
            "createdAt": "2025-03-01T08:30:00"
        }"#;
        let row: MedicationRequest = serde_json::from_str(json).unwrap();
        assert!(!row.is_confirmed);
        assert!(row.is_pending());
    }

    #[test]
    fn null_confirmation_flag_reads_as_pending() {
        let row: MedicationRequest =
            serde_json::from_str(&base_row("\"confirmed\"", "null")).unwrap();
        assert!(!row.is_confirmed);
    }

    #[test]
    fn serialization_emits_canonical_flag_name() {
        let row: MedicationRequest =
            serde_json::from_str(&base_row("\"confirmed\"", "true")).unwrap();
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"isConfirmed\":true"));
        assert!(!json.contains("\"confirmed\":"));
    }

    #[test]
    fn payload_omits_absent_optionals() {
        let payload = MedicationRequestPayload {
            student: StudentRef { student_id: 12 },
            medication_name: "Cetirizine".into(),
            dosage: "5mg".into(),
            frequency: "Once daily".into(),
            total_quantity: Some(20),
            morning_quantity: Some("1".into()),
            noon_quantity: None,
            evening_quantity: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"student\":{\"studentId\":12}"));
        assert!(json.contains("\"totalQuantity\":20"));
        assert!(json.contains("\"morningQuantity\":\"1\""));
        assert!(!json.contains("noonQuantity"));
        assert!(!json.contains("eveningQuantity"));
    }

    #[test]
    fn timestamps_parse_without_offset() {
        let row: MedicationRequest =
            serde_json::from_str(&base_row("\"isConfirmed\"", "false")).unwrap();
        assert_eq!(row.created_at.to_string(), "2025-03-01 08:30:00");
        assert!(row.confirmed_at.is_none());
    }
}

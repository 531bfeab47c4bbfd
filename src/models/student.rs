use serde::{Deserialize, Serialize};

/// A student record as the backend returns it from the code lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<chrono::NaiveDate>,
}

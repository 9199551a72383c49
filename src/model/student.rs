use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Allowed values for the `status` validation rule.
pub const STUDENT_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "PENDING"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StudentStatus {
    Active,
    Inactive,
    Pending,
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "student_number": "2024-0001",
        "full_name": "Juan Dela Cruz",
        "course": "BSIT",
        "year_level": 3,
        "status": "ACTIVE",
        "time_in": "2024-03-01T07:55:00",
        "time_out": "2024-03-01T16:30:00",
        "section": "3-A",
        "teacher": "Ms. Reyes",
        "created_at": "2024-03-01T00:00:00Z",
        "updated_at": "2024-03-01T00:00:00Z"
    })
)]
pub struct Student {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "2024-0001")]
    pub student_number: String,

    #[schema(example = "Juan Dela Cruz")]
    pub full_name: String,

    #[schema(example = "BSIT")]
    pub course: String,

    #[schema(example = 3)]
    pub year_level: i32,

    #[schema(example = "ACTIVE")]
    pub status: StudentStatus,

    #[schema(example = "2024-03-01 07:55:00", value_type = String, nullable = true)]
    pub time_in: Option<NaiveDateTime>,

    #[schema(example = "2024-03-01 16:30:00", value_type = String, nullable = true)]
    pub time_out: Option<NaiveDateTime>,

    #[schema(example = "3-A")]
    pub section: String,

    #[schema(example = "Ms. Reyes")]
    pub teacher: String,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_and_displays_uppercase() {
        assert_eq!(StudentStatus::from_str("ACTIVE").unwrap(), StudentStatus::Active);
        assert_eq!(StudentStatus::Pending.to_string(), "PENDING");
        assert!(StudentStatus::from_str("GRADUATED").is_err());
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(StudentStatus::default(), StudentStatus::Active);
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::student::Student;

/// Allowed values for the `status` validation rule.
pub const ATTENDANCE_STATUSES: &[&str] = &["Present", "Absent", "Late"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub student_id: u64,
    #[schema(example = "2024-03-01 08:10:00", value_type = String)]
    pub date: NaiveDateTime,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

/// An attendance record eagerly joined with its owning student, as served
/// by the list and get-by-id operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceWithStudent {
    pub id: u64,
    pub student_id: u64,
    #[schema(example = "2024-03-01 08:10:00", value_type = String)]
    pub date: NaiveDateTime,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub student: Student,
}

use crate::api::attendance::{CreateAttendance, UpdateAttendance};
use crate::api::student::{CreateStudent, UpdateStudent};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceWithStudent};
use crate::model::student::{Student, StudentStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Student Attendance Tracker

This API tracks **students** and their daily **attendance records**.

### 🔹 Key Features
- **Student Management**
  - Save, update, list, and delete student profiles
- **Attendance Management**
  - Record attendance per student with Present / Absent / Late statuses
  - Arrivals at **08:45:00 or later** are automatically recorded as **Late**
  - Per-student attendance history

### 📦 Response Format
Every endpoint answers with a uniform JSON envelope:
`{ success, message, data?, errors?, error? }`
- `201` on save, `200` on other successes
- `422` with per-field `errors` on validation failure
- `404` when the target record does not exist
- `500` with the failure message in `error`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::student::save_student,
        crate::api::student::list_students,
        crate::api::student::update_student,
        crate::api::student::delete_student,

        crate::api::attendance::save_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::list_attendance_by_student,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance
    ),
    components(
        schemas(
            Student,
            StudentStatus,
            CreateStudent,
            UpdateStudent,
            AttendanceRecord,
            AttendanceWithStudent,
            AttendanceStatus,
            CreateAttendance,
            UpdateAttendance
        )
    ),
    tags(
        (name = "Student", description = "Student management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

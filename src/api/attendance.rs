use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::response;
use crate::service::attendance::AttendanceService;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = 1)]
    pub student_id: u64,
    /// Arrival timestamp; 08:45:00 or later records the entry as Late.
    #[schema(example = "2024-03-01 08:10:00", value_type = String)]
    pub date: String,
    #[schema(example = "Present")]
    pub status: String,
    #[schema(example = "Seated on time", nullable = true)]
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    pub student_id: Option<u64>,
    #[schema(example = "2024-03-01 08:50:00", nullable = true)]
    pub date: Option<String>,
    #[schema(example = "Absent", nullable = true)]
    pub status: Option<String>,
    pub remarks: Option<String>,
}

/// Save an attendance record
#[utoipa::path(
    post,
    path = "/attendance/save",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance record saved successfully", body = Object, example = json!({
            "success": true,
            "message": "Attendance record saved successfully",
            "data": { "id": 1, "student_id": 1, "status": "Late" }
        })),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "success": false,
            "message": "Validation failed",
            "errors": { "student_id": ["student_id must reference an existing student"] }
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn save_attendance(
    service: web::Data<AttendanceService>,
    payload: web::Json<Value>,
) -> HttpResponse {
    match service.create(&payload).await {
        Ok(record) => response::created("Attendance record saved successfully", record),
        Err(e) => e.respond("Failed to save attendance record"),
    }
}

/// List attendance records with their students
#[utoipa::path(
    get,
    path = "/attendance/get",
    responses(
        (status = 200, description = "Attendance records retrieved successfully", body = Object, example = json!({
            "success": true,
            "message": "Attendance records retrieved successfully",
            "data": []
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(service: web::Data<AttendanceService>) -> HttpResponse {
    match service.list().await {
        Ok(records) => response::ok("Attendance records retrieved successfully", records),
        Err(e) => e.respond("Failed to retrieve attendance records"),
    }
}

/// List one student's attendance records
#[utoipa::path(
    get,
    path = "/attendance/student/{student_id}",
    params(
        ("student_id", Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student attendance records retrieved successfully", body = Object, example = json!({
            "success": true,
            "message": "Student attendance records retrieved successfully",
            "data": []
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance_by_student(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> HttpResponse {
    let student_id = path.into_inner();
    match service.list_by_student(student_id).await {
        Ok(records) => response::ok("Student attendance records retrieved successfully", records),
        Err(e) => e.respond("Failed to retrieve student attendance records"),
    }
}

/// Update an attendance record
#[utoipa::path(
    put,
    path = "/attendance/update/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Attendance record updated successfully", body = Object, example = json!({
            "success": true,
            "message": "Attendance record updated successfully",
            "data": { "id": 1, "status": "Late" }
        })),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "success": false,
            "message": "Attendance record not found"
        })),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_attendance(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> HttpResponse {
    let id = path.into_inner();
    match service.update(id, &payload).await {
        Ok(record) => response::ok("Attendance record updated successfully", record),
        Err(e) => e.respond("Failed to update attendance record"),
    }
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/attendance/delete/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record deleted successfully", body = Object, example = json!({
            "success": true,
            "message": "Attendance record deleted successfully"
        })),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> HttpResponse {
    let id = path.into_inner();
    match service.delete(id).await {
        Ok(()) => response::deleted("Attendance record deleted successfully"),
        Err(e) => e.respond("Failed to delete attendance record"),
    }
}

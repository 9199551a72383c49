use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::response;
use crate::service::student::StudentService;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateStudent {
    #[schema(example = "2024-0001", value_type = String)]
    pub student_number: String,
    #[schema(example = "Juan Dela Cruz", value_type = String)]
    pub full_name: String,
    #[schema(example = "BSIT", value_type = String)]
    pub course: String,
    #[schema(example = 3)]
    pub year_level: i32,
    #[schema(example = "ACTIVE", nullable = true)]
    pub status: Option<String>,
    #[schema(example = "3-A", value_type = String)]
    pub section: String,
    #[schema(example = "Ms. Reyes", value_type = String)]
    pub teacher: String,
    #[schema(example = "2024-03-01 07:55:00", nullable = true)]
    pub time_in: Option<String>,
    #[schema(example = "2024-03-01 16:30:00", nullable = true)]
    pub time_out: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStudent {
    pub student_number: Option<String>,
    pub full_name: Option<String>,
    pub course: Option<String>,
    pub year_level: Option<i32>,
    #[schema(example = "INACTIVE", nullable = true)]
    pub status: Option<String>,
    pub section: Option<String>,
    pub teacher: Option<String>,
    #[schema(example = "2024-03-01 07:55:00", nullable = true)]
    pub time_in: Option<String>,
    #[schema(example = "2024-03-01 16:30:00", nullable = true)]
    pub time_out: Option<String>,
}

/// Save a student
#[utoipa::path(
    post,
    path = "/student/save",
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student saved successfully", body = Object, example = json!({
            "success": true,
            "message": "Student saved successfully",
            "data": { "id": 1, "student_number": "2024-0001" }
        })),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "success": false,
            "message": "Validation failed",
            "errors": { "student_number": ["student_number has already been taken"] }
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn save_student(
    service: web::Data<StudentService>,
    payload: web::Json<Value>,
) -> HttpResponse {
    match service.create(&payload).await {
        Ok(student) => response::created("Student saved successfully", student),
        Err(e) => e.respond("Failed to save student"),
    }
}

/// List students
#[utoipa::path(
    get,
    path = "/student/get",
    responses(
        (status = 200, description = "Students retrieved successfully", body = Object, example = json!({
            "success": true,
            "message": "Students retrieved successfully",
            "data": []
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn list_students(service: web::Data<StudentService>) -> HttpResponse {
    match service.list().await {
        Ok(students) => response::ok("Students retrieved successfully", students),
        Err(e) => e.respond("Failed to retrieve students"),
    }
}

/// Update a student
#[utoipa::path(
    put,
    path = "/student/update/{id}",
    params(
        ("id", Path, description = "Student ID")
    ),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated successfully", body = Object, example = json!({
            "success": true,
            "message": "Student updated successfully",
            "data": { "id": 1, "year_level": 4 }
        })),
        (status = 404, description = "Student not found", body = Object, example = json!({
            "success": false,
            "message": "Student not found"
        })),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn update_student(
    service: web::Data<StudentService>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> HttpResponse {
    let id = path.into_inner();
    match service.update(id, &payload).await {
        Ok(student) => response::ok("Student updated successfully", student),
        Err(e) => e.respond("Failed to update student"),
    }
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/student/delete/{id}",
    params(
        ("id", Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = Object, example = json!({
            "success": true,
            "message": "Student deleted successfully"
        })),
        (status = 404, description = "Student not found"),
        (status = 422, description = "Student still has attendance records"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Student"
)]
pub async fn delete_student(
    service: web::Data<StudentService>,
    path: web::Path<u64>,
) -> HttpResponse {
    let id = path.into_inner();
    match service.delete(id).await {
        Ok(()) => response::deleted("Student deleted successfully"),
        Err(e) => e.respond("Failed to delete student"),
    }
}

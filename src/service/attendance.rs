use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::{ApiError, ApiResult, is_constraint_violation};
use crate::model::attendance::{
    ATTENDANCE_STATUSES, AttendanceRecord, AttendanceStatus, AttendanceWithStudent,
};
use crate::model::student::{Student, StudentStatus};
use crate::utils::db_utils::{
    SqlValue, bind_columns, build_insert, build_update, execute_write, set_column,
};
use crate::validate::{FieldKind, FieldRule, Schema, parse_datetime, push};

const UNKNOWN_STUDENT: &str = "student_id must reference an existing student";

const CREATE_SCHEMA: Schema = Schema(&[
    FieldRule {
        name: "student_id",
        required: true,
        kind: FieldKind::Int,
    },
    FieldRule {
        name: "date",
        required: true,
        kind: FieldKind::DateTime,
    },
    FieldRule {
        name: "status",
        required: true,
        kind: FieldKind::Enum { allowed: ATTENDANCE_STATUSES },
    },
    FieldRule {
        name: "remarks",
        required: false,
        kind: FieldKind::Str { max_length: None },
    },
]);

const UPDATE_SCHEMA: Schema = Schema(&[
    FieldRule {
        name: "student_id",
        required: false,
        kind: FieldKind::Int,
    },
    FieldRule {
        name: "date",
        required: false,
        kind: FieldKind::DateTime,
    },
    FieldRule {
        name: "status",
        required: false,
        kind: FieldKind::Enum { allowed: ATTENDANCE_STATUSES },
    },
    FieldRule {
        name: "remarks",
        required: false,
        kind: FieldKind::Str { max_length: None },
    },
]);

/// Arrivals at or after this time of day are recorded as Late.
fn late_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 45, 0).expect("valid cutoff time")
}

/// The one real business rule: an arrival on/after 08:45:00 of its own
/// calendar day is Late, overriding whatever the caller asked for.
pub fn classify_attendance_status(
    date: NaiveDateTime,
    requested: AttendanceStatus,
) -> AttendanceStatus {
    if date.time() >= late_cutoff() {
        AttendanceStatus::Late
    } else {
        requested
    }
}

const JOINED_SELECT: &str = "SELECT \
    a.id, a.student_id, a.date, a.status, a.remarks, \
    s.id AS s_id, s.student_number AS s_student_number, s.full_name AS s_full_name, \
    s.course AS s_course, s.year_level AS s_year_level, s.status AS s_status, \
    s.time_in AS s_time_in, s.time_out AS s_time_out, s.section AS s_section, \
    s.teacher AS s_teacher, s.created_at AS s_created_at, s.updated_at AS s_updated_at \
    FROM attendance_records a \
    JOIN students s ON s.id = a.student_id";

/// Flat row for the eager join; split back into record + student below.
#[derive(sqlx::FromRow)]
struct JoinedRow {
    id: u64,
    student_id: u64,
    date: NaiveDateTime,
    status: AttendanceStatus,
    remarks: Option<String>,
    s_id: u64,
    s_student_number: String,
    s_full_name: String,
    s_course: String,
    s_year_level: i32,
    s_status: StudentStatus,
    s_time_in: Option<NaiveDateTime>,
    s_time_out: Option<NaiveDateTime>,
    s_section: String,
    s_teacher: String,
    s_created_at: Option<DateTime<Utc>>,
    s_updated_at: Option<DateTime<Utc>>,
}

impl From<JoinedRow> for AttendanceWithStudent {
    fn from(row: JoinedRow) -> Self {
        AttendanceWithStudent {
            id: row.id,
            student_id: row.student_id,
            date: row.date,
            status: row.status,
            remarks: row.remarks,
            student: Student {
                id: row.s_id,
                student_number: row.s_student_number,
                full_name: row.s_full_name,
                course: row.s_course,
                year_level: row.s_year_level,
                status: row.s_status,
                time_in: row.s_time_in,
                time_out: row.s_time_out,
                section: row.s_section,
                teacher: row.s_teacher,
                created_at: row.s_created_at,
                updated_at: row.s_updated_at,
            },
        }
    }
}

/// Attendance CRUD plus the late-arrival rule, over the injected pool.
#[derive(Clone)]
pub struct AttendanceService {
    pool: MySqlPool,
}

impl AttendanceService {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<AttendanceWithStudent>> {
        let sql = format!("{JOINED_SELECT} ORDER BY a.id");
        let rows = sqlx::query_as::<_, JoinedRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AttendanceWithStudent::from).collect())
    }

    pub async fn get_by_id(&self, id: u64) -> ApiResult<AttendanceWithStudent> {
        let sql = format!("{JOINED_SELECT} WHERE a.id = ?");
        sqlx::query_as::<_, JoinedRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceWithStudent::from)
            .ok_or(ApiError::NotFound("Attendance record"))
    }

    pub async fn list_by_student(&self, student_id: u64) -> ApiResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, student_id, date, status, remarks FROM attendance_records \
             WHERE student_id = ? ORDER BY id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn create(&self, payload: &Value) -> ApiResult<AttendanceRecord> {
        let mut errors = CREATE_SCHEMA.validate(payload).err().unwrap_or_default();
        if let Some(student_id) = payload.get("student_id").and_then(Value::as_i64) {
            if !errors.contains_key("student_id") && !self.student_exists(student_id).await? {
                push(&mut errors, "student_id", UNKNOWN_STUDENT);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let mut columns = bind_columns(&CREATE_SCHEMA, payload);
        let Some(date) = payload_date(payload) else {
            return Err(ApiError::field(
                "date",
                "date must match the format YYYY-MM-DD HH:MM:SS",
            ));
        };
        let requested = payload_status(payload).unwrap_or(AttendanceStatus::Present);
        set_column(
            &mut columns,
            "status",
            SqlValue::Str(classify_attendance_status(date, requested).to_string()),
        );

        let result = execute_write(&self.pool, build_insert("attendance_records", columns))
            .await
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::field("student_id", UNKNOWN_STUDENT)
                } else {
                    ApiError::Database(e)
                }
            })?;

        self.find_record(result.last_insert_id()).await
    }

    pub async fn update(&self, id: u64, payload: &Value) -> ApiResult<AttendanceWithStudent> {
        let mut errors = UPDATE_SCHEMA.validate(payload).err().unwrap_or_default();
        if let Some(student_id) = payload.get("student_id").and_then(Value::as_i64) {
            if !errors.contains_key("student_id") && !self.student_exists(student_id).await? {
                push(&mut errors, "student_id", UNKNOWN_STUDENT);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let existing = self.find_record(id).await?;

        let mut columns = bind_columns(&UPDATE_SCHEMA, payload);
        // The late rule is re-evaluated only when the patch carries a date;
        // without one the caller-supplied status (if any) stands as-is.
        if let Some(date) = payload_date(payload) {
            let requested = payload_status(payload).unwrap_or(existing.status);
            set_column(
                &mut columns,
                "status",
                SqlValue::Str(classify_attendance_status(date, requested).to_string()),
            );
        }

        if columns.is_empty() {
            return self.get_by_id(id).await;
        }

        execute_write(&self.pool, build_update("attendance_records", columns, id))
            .await
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::field("student_id", UNKNOWN_STUDENT)
                } else {
                    ApiError::Database(e)
                }
            })?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Attendance record"));
        }
        Ok(())
    }

    async fn find_record(&self, id: u64) -> ApiResult<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, student_id, date, status, remarks FROM attendance_records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("Attendance record"))
    }

    async fn student_exists(&self, student_id: i64) -> ApiResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = ? LIMIT 1)",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }
}

fn payload_date(payload: &Value) -> Option<NaiveDateTime> {
    payload
        .get("date")
        .and_then(Value::as_str)
        .and_then(parse_datetime)
}

fn payload_status(payload: &Value) -> Option<AttendanceStatus> {
    payload
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| AttendanceStatus::from_str(s).ok())
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::service::student::StudentService;
    use crate::service::test_support::{offline_pool, test_pool, unique_number};
    use serde_json::json;

    async fn seeded_student(pool: &MySqlPool) -> u64 {
        let service = StudentService::new(pool.clone());
        let payload = json!({
            "student_number": unique_number("AT"),
            "full_name": "Maria Santos",
            "course": "BSCS",
            "year_level": 2,
            "section": "2-B",
            "teacher": "Mr. Cruz",
        });
        service.create(&payload).await.unwrap().id
    }

    async fn cleanup(pool: &MySqlPool, student_id: u64) {
        let attendance = AttendanceService::new(pool.clone());
        for record in attendance.list_by_student(student_id).await.unwrap() {
            attendance.delete(record.id).await.unwrap();
        }
        StudentService::new(pool.clone())
            .delete(student_id)
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn create_requires_all_fields() {
        let service = AttendanceService::new(offline_pool());
        let Err(ApiError::Validation(errors)) = service.create(&json!({})).await else {
            panic!("expected validation failure");
        };
        for field in ["student_id", "date", "status"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[actix_web::test]
    async fn create_rejects_bad_date_and_status() {
        let service = AttendanceService::new(offline_pool());
        let payload = json!({
            "date": "2024-03-01",
            "status": "Excused",
        });
        let Err(ApiError::Validation(errors)) = service.create(&payload).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            errors["date"],
            vec!["date must match the format YYYY-MM-DD HH:MM:SS".to_string()]
        );
        assert_eq!(
            errors["status"],
            vec!["status must be one of: Present, Absent, Late".to_string()]
        );
    }

    #[actix_web::test]
    async fn early_arrival_keeps_the_requested_status() {
        let Some(pool) = test_pool().await else { return };
        let student_id = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());

        let record = service
            .create(&json!({
                "student_id": student_id,
                "date": "2024-03-01 08:44:59",
                "status": "Present",
            }))
            .await
            .unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);

        cleanup(&pool, student_id).await;
    }

    #[actix_web::test]
    async fn on_cutoff_arrival_is_forced_late() {
        let Some(pool) = test_pool().await else { return };
        let student_id = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());

        let record = service
            .create(&json!({
                "student_id": student_id,
                "date": "2024-03-01 08:45:00",
                "status": "Present",
            }))
            .await
            .unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);

        cleanup(&pool, student_id).await;
    }

    #[actix_web::test]
    async fn unknown_student_is_a_validation_failure() {
        let Some(pool) = test_pool().await else { return };
        let service = AttendanceService::new(pool);

        let Err(ApiError::Validation(errors)) = service
            .create(&json!({
                "student_id": i64::MAX,
                "date": "2024-03-01 08:00:00",
                "status": "Present",
            }))
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(errors["student_id"], vec![UNKNOWN_STUDENT.to_string()]);
    }

    #[actix_web::test]
    async fn update_reclassifies_only_when_date_is_patched() {
        let Some(pool) = test_pool().await else { return };
        let student_id = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());

        let record = service
            .create(&json!({
                "student_id": student_id,
                "date": "2024-03-01 08:00:00",
                "status": "Present",
            }))
            .await
            .unwrap();

        // Patch without a date: caller-supplied status stands.
        let updated = service
            .update(record.id, &json!({ "status": "Absent" }))
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Absent);

        // Patch with a late date: status is forced even though the stored
        // one was Absent and the patch asks for Present.
        let updated = service
            .update(
                record.id,
                &json!({ "date": "2024-03-01 09:15:00", "status": "Present" }),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Late);

        // Early date with no status in the patch: stored status survives.
        let updated = service
            .update(record.id, &json!({ "date": "2024-03-01 08:30:00" }))
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Late);

        cleanup(&pool, student_id).await;
    }

    #[actix_web::test]
    async fn list_by_student_filters_and_preserves_insertion_order() {
        let Some(pool) = test_pool().await else { return };
        let first = seeded_student(&pool).await;
        let second = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());

        for (student_id, time) in [
            (first, "2024-03-01 08:00:00"),
            (second, "2024-03-01 08:10:00"),
            (first, "2024-03-02 08:20:00"),
        ] {
            service
                .create(&json!({
                    "student_id": student_id,
                    "date": time,
                    "status": "Present",
                }))
                .await
                .unwrap();
        }

        let records = service.list_by_student(first).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.student_id == first));
        assert!(records[0].id < records[1].id);

        cleanup(&pool, first).await;
        cleanup(&pool, second).await;
    }

    #[actix_web::test]
    async fn joined_reads_carry_the_owning_student() -> Result<(), anyhow::Error> {
        let Some(pool) = test_pool().await else {
            return Ok(());
        };
        let student_id = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());

        let record = service
            .create(&json!({
                "student_id": student_id,
                "date": "2024-03-01 08:00:00",
                "status": "Present",
            }))
            .await?;

        let joined = service.get_by_id(record.id).await?;
        assert_eq!(joined.student.id, student_id);
        assert_eq!(joined.student.full_name, "Maria Santos");

        cleanup(&pool, student_id).await;
        Ok(())
    }

    #[actix_web::test]
    async fn student_with_records_cannot_be_deleted() {
        let Some(pool) = test_pool().await else { return };
        let student_id = seeded_student(&pool).await;
        let service = AttendanceService::new(pool.clone());
        let students = StudentService::new(pool.clone());

        service
            .create(&json!({
                "student_id": student_id,
                "date": "2024-03-01 08:00:00",
                "status": "Present",
            }))
            .await
            .unwrap();

        let Err(ApiError::Validation(errors)) = students.delete(student_id).await else {
            panic!("expected restrict policy to refuse the delete");
        };
        assert_eq!(errors["id"], vec!["student has attendance records".to_string()]);

        cleanup(&pool, student_id).await;
    }

    #[actix_web::test]
    async fn missing_ids_signal_not_found() {
        let Some(pool) = test_pool().await else { return };
        let service = AttendanceService::new(pool);

        let absent = u64::MAX;
        assert!(matches!(
            service.get_by_id(absent).await,
            Err(ApiError::NotFound("Attendance record"))
        ));
        assert!(matches!(
            service.update(absent, &json!({ "status": "Absent" })).await,
            Err(ApiError::NotFound("Attendance record"))
        ));
        assert!(matches!(
            service.delete(absent).await,
            Err(ApiError::NotFound("Attendance record"))
        ));
    }
}

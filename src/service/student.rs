use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::{ApiError, ApiResult, is_constraint_violation};
use crate::model::student::{STUDENT_STATUSES, Student, StudentStatus};
use crate::utils::db_utils::{
    SqlValue, bind_columns, build_insert, build_update, execute_write, has_column, set_column,
};
use crate::validate::{FieldKind, FieldRule, Schema, push};

const NUMBER_TAKEN: &str = "student_number has already been taken";

const CREATE_SCHEMA: Schema = Schema(&[
    FieldRule {
        name: "student_number",
        required: true,
        kind: FieldKind::Str { max_length: Some(50) },
    },
    FieldRule {
        name: "full_name",
        required: true,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "course",
        required: true,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "year_level",
        required: true,
        kind: FieldKind::Int,
    },
    FieldRule {
        name: "status",
        required: false,
        kind: FieldKind::Enum { allowed: STUDENT_STATUSES },
    },
    FieldRule {
        name: "section",
        required: true,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "teacher",
        required: true,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "time_in",
        required: false,
        kind: FieldKind::DateTime,
    },
    FieldRule {
        name: "time_out",
        required: false,
        kind: FieldKind::DateTime,
    },
]);

const UPDATE_SCHEMA: Schema = Schema(&[
    FieldRule {
        name: "student_number",
        required: false,
        kind: FieldKind::Str { max_length: Some(50) },
    },
    FieldRule {
        name: "full_name",
        required: false,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "course",
        required: false,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "year_level",
        required: false,
        kind: FieldKind::Int,
    },
    FieldRule {
        name: "status",
        required: false,
        kind: FieldKind::Enum { allowed: STUDENT_STATUSES },
    },
    FieldRule {
        name: "section",
        required: false,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "teacher",
        required: false,
        kind: FieldKind::Str { max_length: Some(250) },
    },
    FieldRule {
        name: "time_in",
        required: false,
        kind: FieldKind::DateTime,
    },
    FieldRule {
        name: "time_out",
        required: false,
        kind: FieldKind::DateTime,
    },
]);

/// Student CRUD over the injected pool.
#[derive(Clone)]
pub struct StudentService {
    pool: MySqlPool,
}

impl StudentService {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    pub async fn get_by_id(&self, id: u64) -> ApiResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound("Student"))
    }

    pub async fn create(&self, payload: &Value) -> ApiResult<Student> {
        let mut errors = CREATE_SCHEMA.validate(payload).err().unwrap_or_default();
        if let Some(number) = payload.get("student_number").and_then(Value::as_str) {
            if !number.is_empty()
                && !errors.contains_key("student_number")
                && self.number_taken(number, None).await?
            {
                push(&mut errors, "student_number", NUMBER_TAKEN);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let mut columns = bind_columns(&CREATE_SCHEMA, payload);
        if !has_column(&columns, "status") {
            set_column(
                &mut columns,
                "status",
                SqlValue::Str(StudentStatus::default().to_string()),
            );
        }

        let result = execute_write(&self.pool, build_insert("students", columns))
            .await
            .map_err(|e| {
                // Two creates racing past the pre-check: the UNIQUE index
                // rejects the loser, reported as the same validation failure.
                if is_constraint_violation(&e) {
                    ApiError::field("student_number", NUMBER_TAKEN)
                } else {
                    ApiError::Database(e)
                }
            })?;

        self.get_by_id(result.last_insert_id()).await
    }

    pub async fn update(&self, id: u64, payload: &Value) -> ApiResult<Student> {
        let mut errors = UPDATE_SCHEMA.validate(payload).err().unwrap_or_default();
        if let Some(number) = payload.get("student_number").and_then(Value::as_str) {
            if !number.is_empty()
                && !errors.contains_key("student_number")
                && self.number_taken(number, Some(id)).await?
            {
                push(&mut errors, "student_number", NUMBER_TAKEN);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let existing = self.get_by_id(id).await?;

        let columns = bind_columns(&UPDATE_SCHEMA, payload);
        if columns.is_empty() {
            return Ok(existing);
        }

        execute_write(&self.pool, build_update("students", columns, id))
            .await
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::field("student_number", NUMBER_TAKEN)
                } else {
                    ApiError::Database(e)
                }
            })?;

        self.get_by_id(id).await
    }

    /// Delete policy: RESTRICT. A student still referenced by attendance
    /// records cannot be deleted.
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        let referencing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_records WHERE student_id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referencing > 0 {
            return Err(ApiError::field("id", "student has attendance records"));
        }

        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Student"));
        }
        Ok(())
    }

    async fn number_taken(&self, number: &str, exclude_id: Option<u64>) -> ApiResult<bool> {
        let taken = match exclude_id {
            Some(id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT EXISTS(SELECT 1 FROM students WHERE student_number = ? AND id <> ? LIMIT 1)",
                )
                .bind(number)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT EXISTS(SELECT 1 FROM students WHERE student_number = ? LIMIT 1)",
                )
                .bind(number)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(taken != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{offline_pool, test_pool, unique_number};
    use serde_json::json;

    fn student_payload(number: &str) -> Value {
        json!({
            "student_number": number,
            "full_name": "Juan Dela Cruz",
            "course": "BSIT",
            "year_level": 3,
            "section": "3-A",
            "teacher": "Ms. Reyes",
        })
    }

    #[actix_web::test]
    async fn empty_payload_reports_every_required_field() {
        let service = StudentService::new(offline_pool());
        let Err(ApiError::Validation(errors)) = service.create(&json!({})).await else {
            panic!("expected validation failure");
        };
        for field in ["student_number", "full_name", "course", "year_level", "section", "teacher"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[actix_web::test]
    async fn bad_types_fail_before_any_query() {
        let service = StudentService::new(offline_pool());
        let payload = json!({
            "full_name": 42,
            "year_level": "three",
            "status": "EXPELLED",
            "time_in": "yesterday",
        });
        let Err(ApiError::Validation(errors)) = service.update(1, &payload).await else {
            panic!("expected validation failure");
        };
        assert!(errors.contains_key("full_name"));
        assert!(errors.contains_key("year_level"));
        assert!(errors.contains_key("status"));
        assert!(errors.contains_key("time_in"));
    }

    #[actix_web::test]
    async fn create_then_get_returns_the_stored_student() -> Result<(), anyhow::Error> {
        let Some(pool) = test_pool().await else {
            return Ok(());
        };
        let service = StudentService::new(pool);
        let number = unique_number("ST");

        let created = service.create(&student_payload(&number)).await?;
        let fetched = service.get_by_id(created.id).await?;
        assert_eq!(fetched.student_number, number);
        assert_eq!(fetched.full_name, "Juan Dela Cruz");
        assert_eq!(fetched.year_level, 3);
        assert_eq!(fetched.status, StudentStatus::Active);

        service.delete(created.id).await?;
        Ok(())
    }

    #[actix_web::test]
    async fn duplicate_student_number_is_rejected() {
        let Some(pool) = test_pool().await else { return };
        let service = StudentService::new(pool);
        let number = unique_number("ST");

        let created = service.create(&student_payload(&number)).await.unwrap();
        let Err(ApiError::Validation(errors)) = service.create(&student_payload(&number)).await
        else {
            panic!("expected duplicate rejection");
        };
        assert_eq!(errors["student_number"], vec![NUMBER_TAKEN.to_string()]);

        service.delete(created.id).await.unwrap();
    }

    #[actix_web::test]
    async fn partial_update_preserves_absent_fields() {
        let Some(pool) = test_pool().await else { return };
        let service = StudentService::new(pool);
        let number = unique_number("ST");

        let created = service.create(&student_payload(&number)).await.unwrap();
        let updated = service
            .update(created.id, &json!({ "year_level": 4, "status": "INACTIVE" }))
            .await
            .unwrap();
        assert_eq!(updated.year_level, 4);
        assert_eq!(updated.status, StudentStatus::Inactive);
        assert_eq!(updated.full_name, created.full_name);
        assert_eq!(updated.student_number, number);

        // Empty patch: record comes back untouched.
        let unchanged = service.update(created.id, &json!({})).await.unwrap();
        assert_eq!(unchanged.year_level, 4);

        service.delete(created.id).await.unwrap();
    }

    #[actix_web::test]
    async fn missing_ids_signal_not_found() {
        let Some(pool) = test_pool().await else { return };
        let service = StudentService::new(pool);

        let absent = u64::MAX;
        assert!(matches!(
            service.update(absent, &json!({ "year_level": 1 })).await,
            Err(ApiError::NotFound("Student"))
        ));
        assert!(matches!(
            service.delete(absent).await,
            Err(ApiError::NotFound("Student"))
        ));
    }

    #[actix_web::test]
    async fn delete_then_get_signals_not_found() {
        let Some(pool) = test_pool().await else { return };
        let service = StudentService::new(pool);
        let number = unique_number("ST");

        let created = service.create(&student_payload(&number)).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(created.id).await,
            Err(ApiError::NotFound("Student"))
        ));
    }
}

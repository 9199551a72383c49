use actix_web::HttpResponse;
use thiserror::Error;
use tracing::error;

use crate::response::ApiEnvelope;
use crate::validate::{FieldErrors, push};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure taxonomy for the service layer. Everything a service can fail
/// with bubbles unchanged to the handler boundary, where `respond`
/// translates it into the response envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Validation failure on a single field.
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        push(&mut errors, field, message);
        ApiError::Validation(errors)
    }

    /// Translate into the envelope. `context` is the operation-specific
    /// message shown for unexpected failures ("Failed to create student").
    pub fn respond(self, context: &str) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(ApiEnvelope::validation(errors))
            }
            ApiError::NotFound(resource) => {
                HttpResponse::NotFound().json(ApiEnvelope::not_found(resource))
            }
            ApiError::Database(e) => {
                error!(error = %e, context, "database failure");
                HttpResponse::InternalServerError()
                    .json(ApiEnvelope::failure(context, e.to_string()))
            }
        }
    }
}

/// MySQL signals unique/foreign key violations with SQLSTATE 23000; the
/// uniqueness pre-checks can race, so inserts still have to recognize it.
pub fn is_constraint_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23000"))
}

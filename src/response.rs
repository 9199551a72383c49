use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::Value;

use crate::validate::FieldErrors;

/// Uniform response wrapper: every endpoint answers with this shape,
/// success or failure. Absent members are omitted, never null.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiEnvelope {
    pub fn success(message: &str, data: impl Serialize) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
            errors: None,
            error: None,
        }
    }

    /// Success with no data member, e.g. after a delete.
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
            errors: None,
            error: None,
        }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: "Validation failed".to_string(),
            data: None,
            errors: Some(errors),
            error: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            success: false,
            message: format!("{resource} not found"),
            data: None,
            errors: None,
            error: None,
        }
    }

    pub fn failure(message: &str, detail: String) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
            errors: None,
            error: Some(detail),
        }
    }
}

pub fn ok(message: &str, data: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(ApiEnvelope::success(message, data))
}

pub fn created(message: &str, data: impl Serialize) -> HttpResponse {
    HttpResponse::Created().json(ApiEnvelope::success(message, data))
}

pub fn deleted(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiEnvelope::message_only(message))
}

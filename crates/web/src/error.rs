use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use storage::services::access::AccessError;
use storage::services::results::IngestionError;
use validator::ValidationErrors;

/// Web layer errors. Every rejection carries a stable machine-readable code
/// distinct from its human message, so clients can branch without parsing
/// text.
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Ingestion(IngestionError),
    Validation(ValidationErrors),
    BadRequest { code: &'static str, message: String },
    Unauthorized { message: String },
    NotFound { code: &'static str, message: String },
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Ingestion(e) => write!(f, "Ingestion error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            Self::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            Self::NotFound { message, .. } => write!(f, "Not found: {}", message),
        }
    }
}

fn envelope(code: &str, message: &str) -> serde_json::Value {
    json!({ "error": { "code": code, "message": message } })
}

fn ingestion_parts(error: &IngestionError) -> (StatusCode, &'static str) {
    match error {
        IngestionError::EventNotFound => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
        IngestionError::EventCanceled => (StatusCode::CONFLICT, "EVENT_CANCELED"),
        IngestionError::EmptyEntries => (StatusCode::BAD_REQUEST, "EMPTY_ENTRIES"),
        IngestionError::DuplicateDriver => (StatusCode::BAD_REQUEST, "DUPLICATE_DRIVER"),
        IngestionError::DuplicatePosition => (StatusCode::BAD_REQUEST, "DUPLICATE_POSITION"),
        IngestionError::MissingDriver(_) => (StatusCode::BAD_REQUEST, "MISSING_DRIVER"),
        IngestionError::IdempotencyConflict => (StatusCode::CONFLICT, "IDEMPOTENCY_CONFLICT"),
        IngestionError::Access(AccessError::NotMember) => (StatusCode::FORBIDDEN, "NOT_A_MEMBER"),
        IngestionError::Access(AccessError::Forbidden) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        IngestionError::Storage(storage) => storage_parts(storage),
    }
}

fn storage_parts(error: &StorageError) -> (StatusCode, &'static str) {
    match error {
        StorageError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StorageError::ConstraintViolation(_) => (StatusCode::CONFLICT, "CONFLICT"),
        _ if error.is_unique_violation() => (StatusCode::CONFLICT, "CONFLICT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, body) = match &self {
            Self::Storage(error) => {
                let (status, code) = storage_parts(error);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Storage error: {error:?}");
                    (status, envelope(code, "An internal error occurred"))
                } else {
                    (status, envelope(code, &error.to_string()))
                }
            }
            Self::Ingestion(error) => {
                let (status, code) = ingestion_parts(error);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Ingestion error: {error:?}");
                    (status, envelope(code, "An internal error occurred"))
                } else {
                    (status, envelope(code, &error.to_string()))
                }
            }
            Self::Validation(errors) => {
                let details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": {
                            "code": "VALIDATION_ERROR",
                            "message": "Validation failed",
                            "details": details,
                        }
                    }),
                )
            }
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, envelope(code, message))
            }
            Self::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                envelope("MISSING_CONTEXT", message),
            ),
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, envelope(code, message)),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<IngestionError> for WebError {
    fn from(error: IngestionError) -> Self {
        Self::Ingestion(error)
    }
}

impl From<AccessError> for WebError {
    fn from(error: AccessError) -> Self {
        Self::Ingestion(IngestionError::Access(error))
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_errors_map_to_stable_codes() {
        assert_eq!(
            ingestion_parts(&IngestionError::DuplicatePosition),
            (StatusCode::BAD_REQUEST, "DUPLICATE_POSITION")
        );
        assert_eq!(
            ingestion_parts(&IngestionError::MissingDriver(uuid::Uuid::new_v4())),
            (StatusCode::BAD_REQUEST, "MISSING_DRIVER")
        );
        assert_eq!(
            ingestion_parts(&IngestionError::IdempotencyConflict),
            (StatusCode::CONFLICT, "IDEMPOTENCY_CONFLICT")
        );
        assert_eq!(
            ingestion_parts(&IngestionError::EventNotFound),
            (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND")
        );
        assert_eq!(
            ingestion_parts(&IngestionError::EventCanceled),
            (StatusCode::CONFLICT, "EVENT_CANCELED")
        );
        assert_eq!(
            ingestion_parts(&IngestionError::Access(AccessError::Forbidden)),
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        );
    }
}

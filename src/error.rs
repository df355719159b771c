use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use sqlx::postgres::PgDatabaseError;

pub type Result<T> = std::result::Result<T, Error>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A value outside its allowed set or range, or a null on a required column.
    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &str) -> Self {
        Error::NotFound(format!("{} not found", entity))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Json(_) => "BAD_REQUEST",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Invalid(_) | Error::Validation(_) => "VALIDATION_ERROR",
            Error::Config(_) | Error::Database(_) | Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Invalid(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code();
        let error_message = match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Invalid(msg) => msg,
            Error::Validation(err) => err.to_string(),
            Error::Json(err) => err.to_string(),
            Error::Database(err) => {
                tracing::error!(error = %err, "Database error");
                "An unexpected error occurred".to_string()
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An unexpected error occurred".to_string()
            }
        };

        let body = Json(json!({ "error": error_message, "code": code }));
        (status, body).into_response()
    }
}

/// Maps an integrity-violation SQLSTATE onto the taxonomy; `None` leaves it a database error.
fn classify_violation(code: &str, constraint: Option<&str>, column: Option<&str>) -> Option<Error> {
    let constraint = constraint.unwrap_or("unknown");
    match code {
        UNIQUE_VIOLATION => {
            tracing::warn!(constraint = %constraint, "Unique constraint rejected write");
            Some(Error::Conflict(format!(
                "Duplicate value violates unique constraint: {}",
                constraint
            )))
        }
        FOREIGN_KEY_VIOLATION => Some(Error::BadRequest(format!(
            "Referenced record does not exist ({})",
            constraint
        ))),
        CHECK_VIOLATION => Some(Error::Invalid(format!(
            "Value rejected by constraint {}",
            constraint
        ))),
        NOT_NULL_VIOLATION => Some(Error::Invalid(match column {
            Some(column) => format!("{} is required", column),
            None => "A required value is missing".to_string(),
        })),
        _ => None,
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let column = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.column())
                    .map(str::to_string);
                let mapped = db_err
                    .code()
                    .and_then(|code| classify_violation(&code, db_err.constraint(), column.as_deref()));
                match mapped {
                    Some(mapped) => mapped,
                    None => Error::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(Error::Conflict("email".into()).status(), StatusCode::CONFLICT);
        assert_eq!(Error::Invalid("status".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::Invalid("status".into()).code(), "VALIDATION_ERROR");
    }

    #[test]
    fn integrity_violations_are_classified() {
        let err = classify_violation("23505", Some("uq_users_email"), None).unwrap();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("uq_users_email"));

        let err = classify_violation("23503", Some("fk"), None).unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = classify_violation("23514", Some("ck_enrollments_progress"), None).unwrap();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        assert!(classify_violation("40001", None, None).is_none());
    }

    #[test]
    fn not_null_violation_names_the_column() {
        let err = classify_violation("23502", None, Some("progress")).unwrap();
        assert!(matches!(err, Error::Invalid(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "Invalid value: progress is required");

        let err = classify_violation("23502", None, None).unwrap();
        assert_eq!(err.to_string(), "Invalid value: A required value is missing");
    }

    #[tokio::test]
    async fn response_body_carries_message_and_code() {
        let resp = Error::Conflict("email already registered".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["error"], "email already registered");
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let resp = Error::Internal("pool exhausted at 10.0.0.3".into()).into_response();
        let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "An unexpected error occurred");
    }
}

//! Error conversions
//!
//! `From` impls for foreign errors and the HTTP rendering of [`AppError`].

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Driver messages never reach the client: only the kind is derived here.
        let app_err = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted")
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Duplicate key value")
            }
            sqlx::Error::Io(_) => AppError::service_unavailable("Database connection error"),
            _ => AppError::new(ErrorKind::InternalServerError, "Database error"),
        };
        app_err.with_source(err)
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.is_server_error() {
            let correlation_id = uuid::Uuid::new_v4();
            tracing::error!(
                correlation_id = %correlation_id,
                code = %self.code(),
                error = %self,
                source = ?std::error::Error::source(&self),
                "Request failed with server error"
            );
            serde_json::json!({
                "error": self.kind().as_str(),
                "code": self.code(),
                "correlation_id": correlation_id.to_string(),
            })
        } else {
            serde_json::json!({
                "error": self.message(),
                "code": self.code(),
            })
        };

        (status, Json(body)).into_response()
    }
}

use axum::http::StatusCode;

/// How loudly a failure should be reported in the server log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Caller mistakes such as unknown ids or invalid arguments
    Expected,
    /// Failures of the backing store or other infrastructure
    Critical,
}

/// Common trait for all custom error types in the application
pub trait AppError: std::error::Error + Send + Sync + 'static {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get the error code for client handling
    fn error_code(&self) -> &'static str;

    fn error_severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Critical
        } else {
            ErrorSeverity::Expected
        }
    }
}

/// Macro to implement IntoResponse for all AppError types
/// This provides consistent HTTP response formatting
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                use crate::errors::{AppError, ErrorSeverity};
                use axum::response::Json;
                use serde_json::json;

                match self.error_severity() {
                    ErrorSeverity::Critical => {
                        tracing::error!(code = self.error_code(), "{}", self)
                    }
                    ErrorSeverity::Expected => {
                        tracing::debug!(code = self.error_code(), "{}", self)
                    }
                }

                let status = self.status_code();
                let body = Json(json!({
                    "error": self.user_message(),
                    "code": self.error_code(),
                    "status": status.as_u16()
                }));

                (status, body).into_response()
            }
        }
    };
}

pub(crate) use impl_into_response;

// Submodules for entity-specific errors
pub mod court;

pub use court::CourtError;

use axum::http::StatusCode;
use thiserror::Error;

use super::{impl_into_response, AppError, ErrorSeverity};
use crate::models::CourtId;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Errors surfaced by the court operations
#[derive(Error, Debug)]
pub enum CourtError {
    #[error("Court with ID {id} not found")]
    NotFound { id: CourtId },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Store failure: {message}")]
    Store { message: String },
}

impl AppError for CourtError {
    fn status_code(&self) -> StatusCode {
        match self {
            CourtError::NotFound { .. } => StatusCode::NOT_FOUND,
            CourtError::Validation { .. } => StatusCode::BAD_REQUEST,
            CourtError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            CourtError::NotFound { .. } => "Court not found".to_string(),
            CourtError::Validation { message } => message.clone(),
            CourtError::Store { .. } => {
                "The court store could not complete the request".to_string()
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CourtError::NotFound { .. } => "COURT_NOT_FOUND",
            CourtError::Validation { .. } => "COURT_VALIDATION_FAILED",
            CourtError::Store { .. } => "COURT_STORE_ERROR",
        }
    }

    fn error_severity(&self) -> ErrorSeverity {
        match self {
            CourtError::Store { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Expected,
        }
    }
}

impl_into_response!(CourtError);

impl CourtError {
    pub fn not_found(id: CourtId) -> Self {
        Self::NotFound { id }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CourtError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) | StoreError::InvalidCursor(message) => {
                Self::Validation { message }
            }
            StoreError::Backend(err) => Self::Store {
                message: format!("{:#}", err),
            },
        }
    }
}

impl From<SchemaError> for CourtError {
    fn from(err: SchemaError) -> Self {
        Self::validation(err.to_string())
    }
}

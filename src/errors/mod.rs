use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{debug, error, warn};
use serde_json::json;
use thiserror::Error;

pub mod config;
pub mod repository;
pub mod service;

pub use config::ConfigError;
pub use repository::RepositoryError;
pub use service::ServiceError;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    // Request-level errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Gone: {0}")]
    Gone(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        if err.is_business() {
            debug!("Request rejected: {}", err);
        }

        match err {
            ServiceError::InvalidUrl(msg) | ServiceError::InvalidExpiry(msg) => {
                AppError::Validation(msg)
            }
            ServiceError::NotFound(code) => {
                AppError::NotFound(format!("Short code '{}' not found", code))
            }
            ServiceError::Expired(code) => {
                AppError::Gone(format!("Short code '{}' has expired", code))
            }
            ServiceError::Inactive(code) => {
                AppError::Gone(format!("Short code '{}' is inactive", code))
            }
            ServiceError::Timeout(operation) => {
                warn!("Store call timed out during {}", operation);
                AppError::Timeout("The request timed out".to_string())
            }
            ServiceError::Cancelled(operation) => {
                warn!("Store call cancelled during {}", operation);
                AppError::Unavailable("The service is shutting down".to_string())
            }
            err @ (ServiceError::GenerationFailure(_) | ServiceError::StoreFailure { .. }) => {
                error!("{}", err);
                AppError::Internal("An internal error occurred".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Flatten field errors into a single string
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .clone()
                            .unwrap_or_else(|| e.code.clone())
                            .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, reasons)
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::Validation(message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Gone(_) => StatusCode::GONE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_string = self.to_string();
        let (error_type, message) = error_string
            .split_once(':')
            .map(|(t, m)| (t.trim(), m.trim()))
            .unwrap_or(("Error", "An error occurred"));

        let error_message = if message.is_empty() {
            "An error occurred"
        } else {
            message
        };

        let code = self.status_code().as_u16();
        HttpResponse::build(self.status_code()).json(json!({
            "type": error_type.to_uppercase(),
            "message": error_message,
            "status_code": code,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::InvalidUrl("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("abc123".into()), StatusCode::NOT_FOUND),
            (ServiceError::Expired("abc123".into()), StatusCode::GONE),
            (ServiceError::Inactive("abc123".into()), StatusCode::GONE),
            (ServiceError::Timeout("find short link"), StatusCode::GATEWAY_TIMEOUT),
            (ServiceError::Cancelled("find short link"), StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::GenerationFailure("exhausted".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_store_failure_hides_details() {
        let err = ServiceError::store(
            "create short link",
            RepositoryError::InvalidData("secret detail".into()),
        );
        let app_err = AppError::from(err);

        assert_eq!(app_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app_err.to_string().contains("secret detail"));
    }
}

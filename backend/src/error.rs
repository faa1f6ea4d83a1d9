use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use shared::LeaderboardError;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(error: &str, message: &str, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BAD_REQUEST", message, 400)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NOT_FOUND", message, 404)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message, 500)
    }

    pub fn database_error(message: &str) -> Self {
        Self::new("DATABASE_ERROR", message, 500)
    }

    pub fn storage_unavailable(message: &str) -> Self {
        Self::new("STORAGE_UNAVAILABLE", message, 503)
    }

    pub fn validation_error(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message, 400)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = match actix_web::http::StatusCode::from_u16(self.status_code) {
            Ok(status) => status,
            Err(_) => {
                log::warn!("Invalid status code {}, defaulting to 500", self.status_code);
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        HttpResponse::build(status).json(self)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl From<LeaderboardError> for ApiError {
    fn from(err: LeaderboardError) -> Self {
        let message = err.to_string();
        match err {
            LeaderboardError::InvalidWindow(_) => Self::bad_request(&message),
            LeaderboardError::NotFound(_) => Self::not_found(&message),
            LeaderboardError::StorageUnavailable(_) => Self::storage_unavailable(&message),
            LeaderboardError::StorageFault(_) => Self::database_error(&message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation_error(&format!("Validation error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::new("TEST_ERROR", "Test message", 400);
        assert_eq!(error.error, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert_eq!(error.status_code, 400);
    }

    #[test]
    fn test_display_format() {
        let error = ApiError::bad_request("Test message");
        assert_eq!(format!("{}", error), "BAD_REQUEST: Test message");
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError::storage_unavailable("gone").error_response();
        assert_eq!(response.status().as_u16(), 503);
    }

    #[test]
    fn test_invalid_status_code_defaults_to_500() {
        let response = ApiError::new("ODD", "odd", 42).error_response();
        assert_eq!(response.status().as_u16(), 500);
    }

    #[test_case(LeaderboardError::InvalidWindow("start 'abc' is not a number".into()), "BAD_REQUEST", 400 ; "invalid window")]
    #[test_case(LeaderboardError::level_not_found("lvl"), "NOT_FOUND", 404 ; "not found")]
    #[test_case(LeaderboardError::StorageUnavailable("missing".into()), "STORAGE_UNAVAILABLE", 503 ; "unavailable")]
    #[test_case(LeaderboardError::StorageFault("disk I/O error".into()), "DATABASE_ERROR", 500 ; "fault")]
    fn test_from_leaderboard_error(err: LeaderboardError, code: &str, status: u16) {
        let message = err.to_string();
        let api_error: ApiError = err.into();
        assert_eq!(api_error.error, code);
        assert_eq!(api_error.status_code, status);
        assert_eq!(api_error.message, message);
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut validation_error = ValidationError::new("range");
        validation_error.message = Some("count must be between 1 and 500".into());
        errors.add("count", validation_error);

        let api_error: ApiError = errors.into();
        assert_eq!(api_error.error, "VALIDATION_ERROR");
        assert!(api_error.message.contains("Validation error"));
        assert_eq!(api_error.status_code, 400);
    }
}

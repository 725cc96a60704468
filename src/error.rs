//! HTTP error responses.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::inference;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(json!({
            "error": {
                "message": self.message,
                "type": match self.status {
                    StatusCode::BAD_REQUEST => "invalid_request_error",
                    _ => "server_error",
                },
            }
        }))
    }
}

impl From<inference::Error> for ApiError {
    fn from(err: inference::Error) -> Self {
        match &err {
            inference::Error::InvalidInput(_) => ApiError::bad_request(err.to_string()),
            _ => {
                // Model failures surface as a generic 500; the detail stays in
                // the log.
                error!("inference call failed: {err}");
                ApiError::internal("inference failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_400_with_message() {
        let err: ApiError = inference::Error::InvalidInput("text must not be empty".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("text must not be empty"));
    }

    #[test]
    fn model_failures_map_to_generic_500() {
        let err: ApiError = inference::Error::Model("tensor shape mismatch".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("tensor shape mismatch"));
    }
}

//! Mapping from rate failures to HTTP responses.

use crate::core::RatesError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str =
    "No currency with that name was found. Check spelling and try again";
pub const MISSING_PARAMETERS_MESSAGE: &str = "Some of required parameters are missing";
pub const OUT_OF_RANGE_MESSAGE: &str = "Amount is too large to convert";

/// The `{"message": ..}` envelope used for every non-data response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(MessageResponse {
            message: message.to_string(),
        })
    }
}

/// Failures that reach the caller as an error status.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RatesError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            RatesError::Fetch(_) | RatesError::Parse(_) => StatusCode::BAD_GATEWAY,
            RatesError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RatesError::NotFound(_) | RatesError::Validation(_) | RatesError::OutOfRange(_) => {
                StatusCode::OK
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.0 {
            RatesError::Fetch(_) | RatesError::Parse(_) => {
                error!(kind = self.0.kind(), error = %self.0, "Upstream rates unavailable");
                "Exchange rates are temporarily unavailable".to_string()
            }
            RatesError::Store(_) => {
                error!(error = %self.0, "Rate store failure");
                "Internal error".to_string()
            }
            RatesError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            RatesError::Validation(_) => MISSING_PARAMETERS_MESSAGE.to_string(),
            RatesError::OutOfRange(_) => OUT_OF_RANGE_MESSAGE.to_string(),
        };
        HttpResponse::build(self.status_code()).json(MessageResponse { message })
    }
}

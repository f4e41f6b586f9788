use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use harvest_core::error::{AppError, ScrapeFailure};

use crate::dto::ErrorResponse;

/// Error returned by route handlers, rendered as a JSON [`ErrorResponse`].
pub enum ApiError {
    App(AppError),
    NotFound(String),
    Conflict(String),
    /// A manual scrape failed; only the message is reported.
    ScrapeFailed(ScrapeFailure),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ScrapeFailure> for ApiError {
    fn from(failure: ScrapeFailure) -> Self {
        Self::ScrapeFailed(failure)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message.clone()),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message.clone()),
            ApiError::ScrapeFailed(failure) => {
                (StatusCode::BAD_GATEWAY, "scrape_failed", failure.message.clone())
            }
            ApiError::App(err) => {
                let (status, error_type) = match err {
                    AppError::InvalidUrl(_)
                    | AppError::SelectorError { .. }
                    | AppError::ParseError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    AppError::SerializationError(_) => {
                        (StatusCode::BAD_REQUEST, "serialization_error")
                    }
                    AppError::HttpError(_) | AppError::NetworkError(_) => {
                        (StatusCode::BAD_GATEWAY, "upstream_error")
                    }
                    AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                    AppError::DatabaseError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                    }
                    AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
                    AppError::Generic(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
                };
                (status, error_type, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = error_type, %message, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

//! Mapping from library errors to HTTP responses

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can return; each maps to exactly one status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::Validation(msg) => ApiError::BadRequest(msg),
            e @ crate::Error::InvalidDate(_) => ApiError::BadRequest(e.to_string()),
            e @ crate::Error::PersonNotFound(_) => ApiError::NotFound(e.to_string()),
            e => {
                tracing::error!("request failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

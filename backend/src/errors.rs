use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use psi_circuit::error::ZkError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error")]
    Internal,
}

impl From<ZkError> for ApiError {
    fn from(e: ZkError) -> Self {
        match e {
            ZkError::LengthMismatch { .. } | ZkError::CapacityExceeded { .. } => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

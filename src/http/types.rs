use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::repository::StoreError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub error: String }

/// Terminal failure of a single request, rendered as `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError { pub status: StatusCode, pub message: &'static str }

impl ApiError {
    pub const fn new(status: StatusCode, message: &'static str) -> Self { Self { status, message } }

    pub const fn bad_request(message: &'static str) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub const fn not_found(message: &'static str) -> Self { Self::new(StatusCode::NOT_FOUND, message) }

    pub const fn internal() -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error") }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::not_found("Todo not found"),
            StoreError::InvalidInput(_) => Self::bad_request("Title is required"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(ErrorBody { error: self.message.to_string() })).into_response()
    }
}

/// A fully formed response: status plus an already-encoded JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply { pub status: StatusCode, pub body: Vec<u8> }

impl Reply {
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(value).map_err(|e| {
            tracing::error!(error = %e, "failed to encode response");
            ApiError::internal()
        })?;
        Ok(Self { status, body })
    }

    pub fn empty(status: StatusCode) -> Self { Self { status, body: Vec::new() } }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

//! Maps [`codec_core::CodecError`] onto HTTP statuses, the Rust analog of
//! the original service's `responses.ErrBadRequest`/`ErrInternalServer`
//! renderers (`internal/handler/compression.go`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codec_core::CodecError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Thin wrapper so handlers can `?`-propagate both codec errors and
/// request-shape errors (missing multipart fields, bad query params)
/// through the same `IntoResponse` impl.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        let status = match &err {
            CodecError::InvalidData(_)
            | CodecError::MessageTooLong(_)
            | CodecError::InvalidCiphertext(_)
            | CodecError::InvalidPadding(_) => StatusCode::BAD_REQUEST,
            CodecError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("internal failure: {}", self.message);
        } else {
            log::warn!("bad request: {}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

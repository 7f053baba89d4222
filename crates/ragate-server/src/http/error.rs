//! Maps pipeline/domain errors onto HTTP responses (spec §4.8, §7).
//!
//! Embed-stage failures surface as `502` (an upstream collaborator
//! misbehaved); store-stage failures surface as `500` (this service's
//! own dependency misbehaved). Filter/rerank failures never reach this
//! module at all - the query pipeline degrades them internally.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ragate_application::pipelines::{QueryError, UpsertError};
use ragate_domain::error::Error;
use serde_json::json;

/// An HTTP-facing error, already tagged with the status it maps to.
#[derive(Debug)]
pub enum ApiError {
    /// `400` - the request failed validation.
    Validation(Error),
    /// `401` - missing or invalid credentials.
    Auth(Error),
    /// `404` - referenced collection does not exist.
    NotFound(Error),
    /// `500` - startup/runtime misconfiguration surfaced mid-request.
    Config(Error),
    /// `502` - the embedding or rerank upstream failed.
    RemoteUpstream(Error),
    /// `500` - the vector store failed.
    RemoteStore(Error),
    /// `400` - the memory backend's capacity cap was exceeded.
    Capacity(Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &Error) {
        match self {
            Self::Validation(e) | Self::Capacity(e) => (StatusCode::BAD_REQUEST, e),
            Self::Auth(e) => (StatusCode::UNAUTHORIZED, e),
            Self::NotFound(e) => (StatusCode::NOT_FOUND, e),
            Self::Config(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
            Self::RemoteUpstream(e) => (StatusCode::BAD_GATEWAY, e),
            Self::RemoteStore(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

/// Maps an embed-stage domain error onto a status (spec §7: embed
/// failures are treated as upstream, never as this service's fault).
fn map_embed_error(error: Error) -> ApiError {
    match error {
        Error::Validation { .. } => ApiError::Validation(error),
        Error::Config { .. } => ApiError::Config(error),
        Error::Remote { .. } | Error::Format { .. } | Error::Auth { .. } | Error::NotFound { .. } | Error::Capacity { .. } | Error::Io(_) | Error::Json(_) => {
            ApiError::RemoteUpstream(error)
        }
    }
}

/// Maps a retrieve/store-stage domain error onto a status (spec §7:
/// store failures are internal, never `502`).
fn map_store_error(error: Error) -> ApiError {
    match error {
        Error::Validation { .. } => ApiError::Validation(error),
        Error::NotFound { .. } => ApiError::NotFound(error),
        Error::Config { .. } => ApiError::Config(error),
        Error::Capacity { .. } => ApiError::Capacity(error),
        Error::Remote { .. } | Error::Format { .. } | Error::Auth { .. } | Error::Io(_) | Error::Json(_) => ApiError::RemoteStore(error),
    }
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Validation(e) => ApiError::Validation(e),
            QueryError::Embed(e) => map_embed_error(e),
            QueryError::Retrieve(e) => map_store_error(e),
        }
    }
}

impl From<UpsertError> for ApiError {
    fn from(error: UpsertError) -> Self {
        match error {
            UpsertError::Validation(e) => ApiError::Validation(e),
            UpsertError::Embed(e) => map_embed_error(e),
            UpsertError::Store(e) => map_store_error(e),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::Validation { .. } => ApiError::Validation(error),
            Error::Auth { .. } => ApiError::Auth(error),
            Error::NotFound { .. } => ApiError::NotFound(error),
            Error::Config { .. } => ApiError::Config(error),
            Error::Capacity { .. } => ApiError::Capacity(error),
            Error::Remote { .. } | Error::Format { .. } | Error::Io(_) | Error::Json(_) => ApiError::RemoteStore(error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        let detail = error.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = %detail, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), detail = %detail, "request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

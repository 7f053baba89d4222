//! Bearer/`X-API-Key` authentication middleware (spec §4.8 "Auth").
//!
//! Only mounted on the protected sub-router; `/healthz` is wired
//! outside this layer and is never subject to it (spec §4.8 "health
//! endpoints bypass auth").

use crate::http::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderName;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use ragate_domain::error::Error;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Rejects requests that carry neither a matching `Authorization:
/// Bearer <token>` header nor a matching `X-API-Key` header, when an
/// auth token is configured. Auth is disabled entirely when
/// `auth_token` is unset or empty.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.auth_token.as_deref().filter(|token| !token.is_empty()) else {
        return Ok(next.run(request).await);
    };

    let bearer_token = bearer.as_ref().map(|TypedHeader(value)| value.token());
    let api_key = request.headers().get(&API_KEY_HEADER).and_then(|value| value.to_str().ok());

    if bearer_token == Some(expected) || api_key == Some(expected) {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::from(Error::auth("missing or invalid credentials")))
    }
}

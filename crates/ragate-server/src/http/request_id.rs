//! Request ID propagation (spec §4.8 ambient logging: ties one request's
//! log lines together).
//!
//! Takes `X-Request-Id` from the incoming request when present, otherwise
//! generates a UUIDv4. The id is attached to the current tracing span and
//! echoed back on the response so a caller can correlate their own logs
//! against ours.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request id, both inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reads or generates the request id, wraps the rest of the request in a
/// span carrying it, and echoes it back on the response headers.
pub async fn propagate_request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("invalid")));

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn router() -> Router {
        Router::new().route("/", get(ok_handler)).layer(from_fn(propagate_request_id))
    }

    #[tokio::test]
    async fn generates_an_id_when_none_is_supplied() {
        let response = router().oneshot(HttpRequest::builder().uri("/").body(Body::empty()).expect("build request")).await.expect("call router");
        let header = response.headers().get(REQUEST_ID_HEADER).expect("request id header present");
        assert!(Uuid::parse_str(header.to_str().expect("ascii header")).is_ok());
    }

    #[tokio::test]
    async fn echoes_back_a_caller_supplied_id() {
        let response = router()
            .oneshot(HttpRequest::builder().uri("/").header(REQUEST_ID_HEADER, "caller-chosen-id").body(Body::empty()).expect("build request"))
            .await
            .expect("call router");
        let header = response.headers().get(REQUEST_ID_HEADER).expect("request id header present");
        assert_eq!(header.to_str().expect("ascii header"), "caller-chosen-id");
    }
}

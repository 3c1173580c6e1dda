use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_UPSTREAM_ID_LEN: usize = 64;

/// Per-request identifier, present on both the request and the response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Reuse the id a fronting proxy assigned when it looks like a token,
    /// otherwise mint a fresh one.
    fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|id| is_token(id))
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        Self { request_id }
    }
}

fn is_token(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= MAX_UPSTREAM_ID_LEN
        && candidate
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_headers(request.headers());
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log failed requests with the diagnostic their handler attached. Missing
/// pages and access challenges are routine and stay at debug level.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let elapsed_ms = started.elapsed().as_millis();
    let report = response.extensions_mut().remove::<ErrorReport>();
    let source = report.as_ref().map_or("unknown", |report| report.source);
    let detail = report
        .as_ref()
        .map_or("no diagnostic available", ErrorReport::detail);
    let chain = report
        .as_ref()
        .map(|report| report.messages.as_slice())
        .unwrap_or_default();

    if status.is_server_error() {
        error!(
            target = "praxis::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms,
            source,
            detail,
            chain = ?chain,
            request_id = %request_id,
            "request failed"
        );
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::UNAUTHORIZED {
        debug!(
            target = "praxis::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            source,
            request_id = %request_id,
            "request not served"
        );
    } else {
        warn!(
            target = "praxis::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms,
            source,
            detail,
            chain = ?chain,
            request_id = %request_id,
            "client request error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).expect("header"));
        headers
    }

    #[test]
    fn upstream_token_ids_are_kept() {
        let ctx = RequestContext::from_headers(&headers("edge-7f3a_01"));
        assert_eq!(ctx.request_id, "edge-7f3a_01");
    }

    #[test]
    fn unusable_upstream_ids_are_replaced() {
        let oversized = "x".repeat(65);
        for id in ["", "has space", "semi;colon", oversized.as_str()] {
            let ctx = RequestContext::from_headers(&headers(id));
            assert_ne!(ctx.request_id, id);
            assert!(Uuid::parse_str(&ctx.request_id).is_ok(), "{id:?}");
        }
        let ctx = RequestContext::from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
    }
}

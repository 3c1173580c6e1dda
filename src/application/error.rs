//! Error types shared by services, handlers and the binary.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::infra::error::InfraError;

/// Messages of `error` and of every error in its `source()` chain, outermost
/// first.
pub fn error_chain(error: &dyn StdError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    messages
}

/// Diagnostic stored in the response extensions of a failed request. The
/// response logger removes it, so it never reaches the visitor.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        Self {
            source,
            status,
            messages: error_chain(error),
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    /// Outermost message.
    pub fn detail(&self) -> &str {
        self.messages
            .first()
            .map_or("no diagnostic available", String::as_str)
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A page that could not be produced. Handlers turn it into the site's error
/// page; the report only feeds the logs.
#[derive(Debug)]
pub struct HttpError {
    report: ErrorReport,
}

impl HttpError {
    pub fn new(source: &'static str, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        Self {
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.report.status
    }

    pub fn into_report(self) -> ErrorReport {
        self.report
    }
}

/// Bare fallback for when even the error page cannot be rendered.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        let mut response = (status, reason).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Fatal errors surfaced by the binary entry points.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("failed to load treatments")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn chain_walks_every_source() {
        let err = Outer(std::io::Error::other("disk unplugged"));
        assert_eq!(
            error_chain(&err),
            vec!["failed to load treatments", "disk unplugged"]
        );
    }

    #[test]
    fn fallback_response_hides_the_diagnostic() {
        let response =
            HttpError::new("tests", StatusCode::BAD_GATEWAY, "relay at 10.0.0.3 timed out")
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.detail(), "relay at 10.0.0.3 timed out");
    }
}

//! HTTP Basic access gate for staging deployments.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use metrics::counter;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use crate::application::error::ErrorReport;
use crate::infra::error::InfraError;

pub(crate) const ACCESS_DENIED_METRIC: &str = "praxis_access_denied_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("missing credentials")]
    Missing,
    #[error("malformed credentials")]
    Malformed,
    #[error("invalid credentials")]
    Invalid,
}

/// Expected credentials, kept only as SHA-256 digests.
pub struct AccessGate {
    username: Vec<u8>,
    password: Vec<u8>,
    challenge: HeaderValue,
}

impl AccessGate {
    pub fn new(username: &str, password: &str, realm: &str) -> Result<Self, InfraError> {
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
            .map_err(|err| {
                InfraError::setup(
                    "access gate",
                    format!("realm is not a valid header value: {err}"),
                )
            })?;

        Ok(Self {
            username: digest(username),
            password: digest(password),
            challenge,
        })
    }

    pub fn challenge(&self) -> &HeaderValue {
        &self.challenge
    }

    pub fn check(&self, header: Option<&HeaderValue>) -> Result<(), AccessDenied> {
        let header = header.ok_or(AccessDenied::Missing)?;
        let (username, password) = parse_basic(header).ok_or(AccessDenied::Malformed)?;

        let username_matches = self.username.ct_eq(&digest(&username));
        let password_matches = self.password.ct_eq(&digest(&password));
        if (username_matches & password_matches).unwrap_u8() == 0 {
            return Err(AccessDenied::Invalid);
        }
        Ok(())
    }
}

pub async fn access_gate(
    State(gate): State<Arc<AccessGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.check(request.headers().get(AUTHORIZATION)) {
        Ok(()) => next.run(request).await,
        Err(denied) => {
            debug!(
                target = "praxis::http::access",
                reason = %denied,
                path = %request.uri().path(),
                "access denied"
            );
            counter!(ACCESS_DENIED_METRIC).increment(1);

            let mut response = (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, gate.challenge().clone())],
                "Authentication required",
            )
                .into_response();
            ErrorReport::from_error(
                "infra::http::access::access_gate",
                StatusCode::UNAUTHORIZED,
                &denied,
            )
            .attach(&mut response);
            response
        }
    }
}

fn digest(value: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().to_vec()
}

fn parse_basic(header: &HeaderValue) -> Option<(String, String)> {
    let raw = header.to_str().ok()?;
    let (scheme, encoded) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(credentials: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(credentials)))
            .expect("header")
    }

    fn gate() -> AccessGate {
        AccessGate::new("staff", "s3cret:with-colon", "Praxis Staging").expect("gate")
    }

    #[test]
    fn accepts_matching_credentials() {
        assert_eq!(gate().check(Some(&basic("staff:s3cret:with-colon"))), Ok(()));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = HeaderValue::from_str(&format!(
            "basic {}",
            STANDARD.encode("staff:s3cret:with-colon")
        ))
        .expect("header");
        assert_eq!(gate().check(Some(&header)), Ok(()));
    }

    #[test]
    fn classifies_rejections() {
        let gate = gate();
        assert_eq!(gate.check(None), Err(AccessDenied::Missing));
        assert_eq!(
            gate.check(Some(&HeaderValue::from_static("Bearer abc"))),
            Err(AccessDenied::Malformed)
        );
        assert_eq!(
            gate.check(Some(&HeaderValue::from_static("Basic !!!"))),
            Err(AccessDenied::Malformed)
        );
        assert_eq!(
            gate.check(Some(&basic("no-colon"))),
            Err(AccessDenied::Malformed)
        );
        assert_eq!(
            gate.check(Some(&basic("staff:wrong"))),
            Err(AccessDenied::Invalid)
        );
        assert_eq!(
            gate.check(Some(&basic("other:s3cret:with-colon"))),
            Err(AccessDenied::Invalid)
        );
    }

    #[test]
    fn challenge_names_the_realm() {
        assert_eq!(gate().challenge(), "Basic realm=\"Praxis Staging\"");
    }

    #[test]
    fn rejects_realms_that_cannot_be_headers() {
        assert!(AccessGate::new("a", "b", "line\nbreak").is_err());
    }
}

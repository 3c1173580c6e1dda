//! Mail transports: a logging sink for development and an HTTP mail relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::application::error::error_chain;
use crate::application::mail::{DeliveryReceipt, MailError, MailTransport, OutboundMessage};
use crate::infra::error::InfraError;

/// Logs messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailError> {
        let message_id = Uuid::new_v4().to_string();
        info!(
            target = "praxis::mail",
            message_id = %message_id,
            subject = %message.subject,
            reply_to = %message.reply_to,
            text_bytes = message.text_body.len(),
            html_bytes = message.html_body.len(),
            "mail transport is `log`; message not delivered"
        );
        debug!(target = "praxis::mail", body = %message.text_body, "message body");
        Ok(DeliveryReceipt {
            message_id: Some(message_id),
        })
    }
}

/// Posts messages as JSON to a transactional mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailTransport {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
    recipient: String,
    sender_address: Option<String>,
}

#[derive(Serialize)]
struct RelayAddress<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: RelayAddress<'a>,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    id: Option<String>,
}

impl HttpMailTransport {
    pub fn new(
        endpoint: Url,
        api_token: Option<String>,
        recipient: String,
        sender_address: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("praxis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| {
                InfraError::setup("mail relay", format!("failed to build http client: {err}"))
            })?;

        Ok(Self {
            client,
            endpoint,
            api_token,
            recipient,
            sender_address,
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailError> {
        let payload = RelayRequest {
            from: RelayAddress {
                name: &message.sender_name,
                email: self.sender_address.as_deref(),
            },
            to: [self.recipient.as_str()],
            reply_to: &message.reply_to,
            subject: &message.subject,
            html: &message.html_body,
            text: &message.text_body,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MailError::AuthenticationFailed);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Unknown(format!(
                "relay answered {status}: {}",
                body.trim()
            )));
        }

        let message_id = response
            .json::<RelayResponse>()
            .await
            .ok()
            .and_then(|body| body.id);
        Ok(DeliveryReceipt { message_id })
    }
}

fn classify_transport_error(err: reqwest::Error) -> MailError {
    let detail = error_chain(&err).join(": ");
    if err.is_connect() {
        if looks_like_tls_failure(&detail) {
            MailError::TransportNegotiation(detail)
        } else {
            MailError::ConnectionRefused(detail)
        }
    } else if err.is_timeout() {
        MailError::ConnectionRefused(detail)
    } else {
        MailError::Unknown(detail)
    }
}

fn looks_like_tls_failure(detail: &str) -> bool {
    let detail = detail.to_ascii_lowercase();
    ["tls", "certificate", "handshake"]
        .iter()
        .any(|needle| detail.contains(needle))
}

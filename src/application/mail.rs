//! Outbound mail seam. Transports live in `infra::mail`.

use async_trait::async_trait;
use thiserror::Error;

/// A composed message ready for delivery. The transport decides the envelope
/// recipient and sender address; the message only carries display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub sender_name: String,
    pub reply_to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("mail relay refused the connection: {0}")]
    ConnectionRefused(String),
    #[error("mail relay rejected the credentials")]
    AuthenticationFailed,
    #[error("secure transport negotiation failed: {0}")]
    TransportNegotiation(String),
    #[error("mail delivery failed: {0}")]
    Unknown(String),
}

impl MailError {
    /// Short label used for log fields and metric labels.
    pub fn category(&self) -> &'static str {
        match self {
            MailError::ConnectionRefused(_) => "connection_refused",
            MailError::AuthenticationFailed => "authentication_failed",
            MailError::TransportNegotiation(_) => "transport_negotiation",
            MailError::Unknown(_) => "unknown",
        }
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailError>;
}

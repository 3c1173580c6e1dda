//! Contact form handling: validation, composition and delivery.

use std::sync::Arc;

use askama::Template;
use metrics::counter;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::mail::{DeliveryReceipt, MailError, MailTransport, OutboundMessage};
use crate::presentation::mail::{ContactMailHtml, ContactMailText};

const MAX_NAME_LEN: usize = 120;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 40;
const MAX_MESSAGE_LEN: usize = 5000;

pub(crate) const CONTACT_METRIC: &str = "praxis_contact_messages_total";

/// Raw form fields as posted by the browser. `website` is a honeypot that
/// humans never see.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Trimmed, length-checked submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Delivered(DeliveryReceipt),
    /// Honeypot was filled: acknowledged to the client, nothing sent.
    Discarded,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact form failed validation")]
    Validation(Vec<FieldError>),
    #[error("failed to compose contact mail: {0}")]
    Compose(String),
    #[error(transparent)]
    Delivery(#[from] MailError),
}

impl ContactError {
    /// Message shown to the visitor.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContactError::Validation(_) => "Please check the highlighted fields and try again.",
            ContactError::Delivery(MailError::ConnectionRefused(_)) => {
                "We could not connect to our mail server. Please try again in a few minutes or give us a call."
            }
            ContactError::Delivery(MailError::AuthenticationFailed) => {
                "Our mail server refused the message. Please give us a call while we fix this."
            }
            ContactError::Delivery(MailError::TransportNegotiation(_)) => {
                "A secure connection to our mail server could not be established. Please try again later."
            }
            ContactError::Delivery(MailError::Unknown(_)) | ContactError::Compose(_) => {
                "An unexpected error occurred. Please try again later or give us a call."
            }
        }
    }

    /// Whether resubmitting the same form later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ContactError::Delivery(MailError::ConnectionRefused(_))
                | ContactError::Delivery(MailError::TransportNegotiation(_))
                | ContactError::Delivery(MailError::Unknown(_))
        )
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ContactError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[derive(Clone)]
pub struct ContactService {
    transport: Arc<dyn MailTransport>,
}

impl ContactService {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<ContactOutcome, ContactError> {
        if !submission.website.trim().is_empty() {
            info!(
                target = "praxis::contact",
                "discarding contact submission with filled honeypot"
            );
            counter!(CONTACT_METRIC, "outcome" => "discarded").increment(1);
            return Ok(ContactOutcome::Discarded);
        }

        let contact = validate(submission).map_err(|errors| {
            counter!(CONTACT_METRIC, "outcome" => "invalid").increment(1);
            ContactError::Validation(errors)
        })?;

        let message = compose(&contact)?;

        match self.transport.send(&message).await {
            Ok(receipt) => {
                info!(
                    target = "praxis::contact",
                    message_id = receipt.message_id.as_deref().unwrap_or(""),
                    "contact message delivered"
                );
                counter!(CONTACT_METRIC, "outcome" => "sent").increment(1);
                Ok(ContactOutcome::Delivered(receipt))
            }
            Err(err) => {
                warn!(
                    target = "praxis::contact",
                    category = err.category(),
                    error = %err,
                    "contact message delivery failed"
                );
                counter!(CONTACT_METRIC, "outcome" => "failed").increment(1);
                Err(ContactError::Delivery(err))
            }
        }
    }
}

pub fn validate(submission: &ContactSubmission) -> Result<ValidatedContact, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = submission.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Please tell us your name."));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new("name", "The name is too long."));
    }

    let email = submission.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new(
            "email",
            "Please enter your email address.",
        ));
    } else if email.len() > MAX_EMAIL_LEN || !is_plausible_email(email) {
        errors.push(FieldError::new(
            "email",
            "Please enter a valid email address.",
        ));
    }

    let phone = submission.phone.trim();
    if phone.chars().count() > MAX_PHONE_LEN {
        errors.push(FieldError::new("phone", "The phone number is too long."));
    }

    let message = submission.message.trim();
    if message.is_empty() {
        errors.push(FieldError::new("message", "Please enter a message."));
    } else if message.chars().count() > MAX_MESSAGE_LEN {
        errors.push(FieldError::new(
            "message",
            "The message is too long. Please shorten it or give us a call.",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedContact {
        name: name.to_string(),
        email: email.to_string(),
        phone: (!phone.is_empty()).then(|| phone.to_string()),
        message: message.to_string(),
    })
}

/// Build the outbound message. The HTML body escapes every visitor-supplied
/// field; the text body carries them verbatim.
pub fn compose(contact: &ValidatedContact) -> Result<OutboundMessage, ContactError> {
    let message_lines: Vec<String> = contact.message.lines().map(str::to_string).collect();

    let html_body = ContactMailHtml {
        name: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        message_lines: message_lines.clone(),
    }
    .render()
    .map_err(|err| ContactError::Compose(err.to_string()))?;

    let text_body = ContactMailText {
        name: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        message_lines,
    }
    .render()
    .map_err(|err| ContactError::Compose(err.to_string()))?;

    Ok(OutboundMessage {
        sender_name: contact.name.clone(),
        reply_to: contact.email.clone(),
        subject: format!("Contact request from {}", single_line(&contact.name)),
        html_body,
        text_body,
    })
}

fn is_plausible_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Subjects are header values: collapse any line breaks a visitor managed to send.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;

use praxis::application::chrome::ChromeService;
use praxis::application::contact::{ContactOutcome, ContactService, ContactSubmission};
use praxis::application::content::ContentService;
use praxis::application::mail::{DeliveryReceipt, MailError, MailTransport, OutboundMessage};
use praxis::application::repos::{ContentRepo, RepoError};
use praxis::config::SiteSettings;
use praxis::domain::entities::{
    PageRecord, PostRecord, TeamMemberRecord, TreatmentRecord, WorkshopRecord,
};
use praxis::infra::http::{HttpState, access::AccessGate, build_router};
use praxis::infra::telemetry;

struct EmptyContent;

#[async_trait]
impl ContentRepo for EmptyContent {
    async fn find_page(&self, _slug: &str) -> Result<Option<PageRecord>, RepoError> {
        Ok(None)
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn find_post(&self, _slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(None)
    }

    async fn list_treatments(&self) -> Result<Vec<TreatmentRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn find_treatment(&self, _slug: &str) -> Result<Option<TreatmentRecord>, RepoError> {
        Ok(None)
    }

    async fn list_team(&self) -> Result<Vec<TeamMemberRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn list_workshops(&self) -> Result<Vec<WorkshopRecord>, RepoError> {
        Ok(Vec::new())
    }
}

/// Accepts mail from everyone except senders named "Fail".
struct SelectiveTransport;

#[async_trait]
impl MailTransport for SelectiveTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, MailError> {
        if message.sender_name == "Fail" {
            Err(MailError::AuthenticationFailed)
        } else {
            Ok(DeliveryReceipt::default())
        }
    }
}

fn submission(name: &str, website: &str) -> ContactSubmission {
    ContactSubmission {
        name: name.into(),
        email: "patient@example.com".into(),
        message: "Do you have an appointment next week?".into(),
        website: website.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn contact_and_access_paths_emit_expected_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let contact = Arc::new(ContactService::new(Arc::new(SelectiveTransport)));

    let outcome = contact
        .submit(&submission("Ada", ""))
        .await
        .expect("delivered");
    assert!(matches!(outcome, ContactOutcome::Delivered(_)));

    let outcome = contact
        .submit(&submission("Bot", "http://spam.example"))
        .await
        .expect("discarded");
    assert_eq!(outcome, ContactOutcome::Discarded);

    contact
        .submit(&submission("", ""))
        .await
        .expect_err("invalid");
    contact
        .submit(&submission("Fail", ""))
        .await
        .expect_err("failed");

    let state = HttpState {
        content: Arc::new(ContentService::new(Arc::new(EmptyContent))),
        chrome: Arc::new(ChromeService::new(&SiteSettings {
            title: "Praxis".into(),
            tagline: String::new(),
            base_url: "http://localhost:3000".into(),
            footer_copy: "© Praxis".into(),
        })),
        contact,
    };
    let gate = AccessGate::new("staff", "hunter2", "Praxis").expect("gate");
    let response = build_router(state, Some(Arc::new(gate)))
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let observed: HashSet<(String, Option<String>)> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| {
            let key = composite_key.key();
            let outcome = key
                .labels()
                .find(|label| label.key() == "outcome" || label.key() == "reason")
                .map(|label| label.value().to_string());
            (key.name().to_string(), outcome)
        })
        .collect();

    for outcome in ["sent", "discarded", "invalid", "failed"] {
        let expected = (
            "praxis_contact_messages_total".to_string(),
            Some(outcome.to_string()),
        );
        assert!(observed.contains(&expected), "missing {expected:?} in {observed:?}");
    }
    assert!(
        observed
            .iter()
            .any(|(name, _)| name == "praxis_access_denied_total"),
        "missing access denial metric in {observed:?}"
    );
}

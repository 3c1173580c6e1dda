use axum::{
    Form,
    extract::State,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::Response,
};

use crate::application::contact::{ContactError, ContactSubmission};
use crate::application::error::ErrorReport;
use crate::presentation::views::{
    ContactFormView, ContactTemplate, ContactView, FieldErrorView, LayoutContext, NoticeView,
    render_template_response,
};

use super::HttpState;

const SOURCE: &str = "infra::http::contact::submit";
const RETRY_AFTER_SECS: &str = "120";
const THANK_YOU: &str = "Thank you for your message. We will get back to you shortly.";

pub(super) async fn form(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(Some("Contact"), "/contact");
    render_template_response(
        ContactTemplate {
            view: LayoutContext::new(chrome, ContactView::blank()),
        },
        StatusCode::OK,
    )
}

pub(super) async fn submit(
    State(state): State<HttpState>,
    Form(submission): Form<ContactSubmission>,
) -> Response {
    let chrome = state.chrome.load(Some("Contact"), "/contact");

    let err = match state.contact.submit(&submission).await {
        Ok(_) => {
            let view = ContactView {
                notice: Some(NoticeView::success(THANK_YOU)),
                ..ContactView::blank()
            };
            return render_template_response(
                ContactTemplate {
                    view: LayoutContext::new(chrome, view),
                },
                StatusCode::OK,
            );
        }
        Err(err) => err,
    };

    let status = failure_status(&err);

    let view = ContactView {
        form: ContactFormView {
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            message: submission.message,
        },
        errors: err
            .field_errors()
            .iter()
            .map(|error| FieldErrorView {
                field: error.field,
                message: error.message,
            })
            .collect(),
        notice: Some(NoticeView::failure(err.user_message())),
    };

    let mut response = render_template_response(
        ContactTemplate {
            view: LayoutContext::new(chrome, view),
        },
        status,
    );
    if err.is_retryable() {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
    }
    ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
    response
}

fn failure_status(err: &ContactError) -> StatusCode {
    match err {
        ContactError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ContactError::Delivery(_) => StatusCode::BAD_GATEWAY,
        ContactError::Compose(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

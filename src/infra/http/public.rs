use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::Response,
};

use crate::presentation::views::{
    BlogTemplate, IndexTemplate, LayoutContext, PageTemplate, PostTemplate, TeamTemplate,
    TreatmentListTemplate, TreatmentTemplate, WorkshopListTemplate, render_error_response,
    render_not_found_response, render_template_response,
};

use super::HttpState;

pub(super) async fn index(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(None, "/");

    match state.content.home().await {
        Ok(content) => render_template_response(
            IndexTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(chrome, err),
    }
}

pub(super) async fn treatments(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(Some("Treatments"), "/treatments");

    match state.content.treatments().await {
        Ok(content) => render_template_response(
            TreatmentListTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(chrome, err),
    }
}

pub(super) async fn treatment_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Response {
    let path = format!("/treatments/{slug}");

    match state.content.treatment(&slug).await {
        Ok(Some(content)) => {
            let mut chrome = state.chrome.load(Some(&content.title), &path);
            if let Some(summary) = &content.summary {
                chrome.meta.description = summary.clone();
            }
            render_template_response(
                TreatmentTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Ok(None) => render_not_found_response(state.chrome.load(None, &path)),
        Err(err) => render_error_response(state.chrome.load(None, &path), err),
    }
}

pub(super) async fn team(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(Some("Team"), "/team");

    match state.content.team().await {
        Ok(content) => render_template_response(
            TeamTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(chrome, err),
    }
}

pub(super) async fn workshops(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(Some("Workshops"), "/workshops");

    match state.content.workshops().await {
        Ok(content) => render_template_response(
            WorkshopListTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(chrome, err),
    }
}

pub(super) async fn blog(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(Some("Blog"), "/blog");

    match state.content.posts().await {
        Ok(content) => render_template_response(
            BlogTemplate {
                view: LayoutContext::new(chrome, content),
            },
            StatusCode::OK,
        ),
        Err(err) => render_error_response(chrome, err),
    }
}

pub(super) async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Response {
    let path = format!("/blog/{slug}");

    match state.content.post(&slug).await {
        Ok(Some((content, description))) => {
            let mut chrome = state.chrome.load(Some(&content.title), &path);
            chrome.meta.description = description;
            render_template_response(
                PostTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Ok(None) => render_not_found_response(state.chrome.load(None, &path)),
        Err(err) => render_error_response(state.chrome.load(None, &path), err),
    }
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Top-level slugs resolve to editor pages; everything else is a 404.
pub(super) async fn fallback_router(
    State(state): State<HttpState>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path();
    let slug = path.trim_matches('/');

    if slug.is_empty() {
        return render_not_found_response(state.chrome.load(None, path));
    }

    match state.content.page(slug).await {
        Ok(Some((content, description))) => {
            let mut chrome = state.chrome.load(Some(&content.title), &format!("/{slug}"));
            if let Some(description) = description {
                chrome.meta.description = description;
            }
            render_template_response(
                PageTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Ok(None) => render_not_found_response(state.chrome.load(None, path)),
        Err(err) => render_error_response(state.chrome.load(None, path), err),
    }
}

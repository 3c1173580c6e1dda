pub mod access;
mod contact;
pub mod middleware;
mod public;

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::application::{chrome::ChromeService, contact::ContactService, content::ContentService};

use self::access::{AccessGate, access_gate};
use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<ContentService>,
    pub chrome: Arc<ChromeService>,
    pub contact: Arc<ContactService>,
}

/// Public site router. When `access` is set every route except `/_health`
/// sits behind the gate.
pub fn build_router(state: HttpState, access: Option<Arc<AccessGate>>) -> Router {
    let site_routes = Router::new()
        .route("/", get(public::index))
        .route("/treatments", get(public::treatments))
        .route("/treatments/{slug}", get(public::treatment_detail))
        .route("/team", get(public::team))
        .route("/workshops", get(public::workshops))
        .route("/blog", get(public::blog))
        .route("/blog/{slug}", get(public::post_detail))
        .route("/contact", get(contact::form).post(contact::submit))
        .fallback(public::fallback_router)
        .with_state(state);

    let site_routes = match access {
        Some(gate) => site_routes.layer(axum_middleware::from_fn_with_state(gate, access_gate)),
        None => site_routes,
    };

    let health_routes = Router::new().route("/_health", get(public::health));

    health_routes
        .merge(site_routes)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

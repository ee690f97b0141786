//! HTTP router and handlers.

use crate::app::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod domains;
pub mod email;
pub mod error;
pub mod inbox;
pub mod webhook;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook::receive_webhook))
        .route("/api/domains", get(domains::get_domains))
        .route("/api/inbox/:inboxid", get(inbox::get_inbox))
        .route("/api/delete/:inboxid", get(inbox::delete_inbox))
        .route("/api/email/:email", get(email::get_email))
        .with_state(state)
}

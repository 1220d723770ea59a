//! Route handlers for the dashboard API

pub mod diagnose;
pub mod errors;
pub mod health;
pub mod overview;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// Body limit sits above the attachment cap. Uploads between the two reach
// the handler's own size check and its 413 message; anything past the body
// limit fails the multipart read, whose length-limit status is also 413.
const MAX_BODY_BYTES: usize = 2 * diagnose::MAX_ATTACHMENT_BYTES;

/// Assemble the full route tree with shared layers.
pub fn configure(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .merge(overview::routes())
        .merge(session::routes())
        .merge(diagnose::routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! Session snapshot route and session-id correlation.
//!
//! Sessions are correlated by the `X-Session-Id` header. A request without
//! one gets a fresh session; the id comes back in the response body so the
//! client can present it on the next request.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use apexzenith::session::SessionSnapshot;

use crate::state::AppState;

/// Header carrying the session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Session id presented by the client, if usable.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Response for the session endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Id to present on subsequent requests
    pub session_id: String,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

/// Current outcome and history of the caller's session
///
/// # Response
/// - `sessionId`: the session the snapshot belongs to
/// - `current`: outcome of the most recent submission, if any
/// - `history`: past records in submission order, oldest first
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session state snapshot", body = SessionResponse)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let session_id = state
        .sessions
        .ensure(session_id_from_headers(&headers).as_deref());

    // ensure() just touched the session, so the snapshot is present unless
    // the TTL is zero; an empty snapshot is the right answer then anyway.
    let snapshot = state.sessions.snapshot(&session_id).unwrap_or_default();

    Json(SessionResponse {
        session_id,
        snapshot,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/session", get(get_session))
}

//! Route definitions for the public tracking endpoints.
//!
//! These are reachable without authentication: they are hit by email
//! clients loading the pixel and by subscribers following rewritten
//! links. Their security model is the unguessability of the id pair,
//! matching the URLs embedded in sent mail.

use axum::routing::get;
use axum::Router;

use crate::handlers::track;
use crate::state::AppState;

/// Tracking routes mounted at `/track`.
///
/// ```text
/// GET /open        -> track_open (1x1 GIF)
/// GET /click       -> track_click (redirect)
/// GET /unsubscribe -> unsubscribe (redirect)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/open", get(track::track_open))
        .route("/click", get(track::track_click))
        .route("/unsubscribe", get(track::unsubscribe))
}

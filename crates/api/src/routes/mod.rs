pub mod auth;
pub mod health;
pub mod newsletter;
pub mod track;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
///
/// /newsletter/send                             compose & send campaign (admin)
/// /newsletter/campaigns                        list campaigns with rates
/// /newsletter/campaigns/{id}/resume            resume interrupted send (admin)
/// /newsletter/analytics                        per-campaign stats (POST)
///
/// /newsletter/tags                             list, create
/// /newsletter/tags/{id}                        update, delete (delete: admin)
///
/// /newsletter/subscribe                        public signup form (POST)
/// /newsletter/subscribers                      list (paginated)
/// /newsletter/subscribers/import               CSV upload (multipart)
/// /newsletter/subscribers/{id}/tags            list, apply
/// /newsletter/subscribers/{id}/tags/{tag_id}   remove (DELETE)
///
/// /track/open                                  tracking pixel (public)
/// /track/click                                 click redirect (public)
/// /track/unsubscribe                           unsubscribe redirect (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes.
        .nest("/auth", auth::router())
        // Newsletter dashboard: campaigns, tags, subscribers.
        .nest("/newsletter", newsletter::router())
        // Public tracking endpoints hit from inside emails.
        .nest("/track", track::router())
}

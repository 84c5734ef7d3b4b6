//! Route definitions for the newsletter dashboard.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{newsletter, subscribers, tags};
use crate::state::AppState;

/// Newsletter routes mounted at `/newsletter`.
///
/// ```text
/// POST   /send                          -> send_campaign (admin)
/// GET    /campaigns                     -> list_campaigns
/// POST   /campaigns/{id}/resume         -> resume_campaign (admin)
/// POST   /analytics                     -> campaign_analytics
/// GET    /tags                          -> list_tags
/// POST   /tags                          -> create_tag
/// PUT    /tags/{id}                     -> update_tag
/// DELETE /tags/{id}                     -> delete_tag (admin)
/// POST   /subscribe                     -> subscribe (public)
/// GET    /subscribers                   -> list_subscribers
/// POST   /subscribers/import            -> import_subscribers
/// GET    /subscribers/{id}/tags         -> get_subscriber_tags
/// POST   /subscribers/{id}/tags         -> apply_subscriber_tag
/// DELETE /subscribers/{id}/tags/{tag_id} -> remove_subscriber_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send", post(newsletter::send_campaign))
        .route("/campaigns", get(newsletter::list_campaigns))
        .route(
            "/campaigns/{id}/resume",
            post(newsletter::resume_campaign),
        )
        .route("/analytics", post(newsletter::campaign_analytics))
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/{id}",
            put(tags::update_tag).delete(tags::delete_tag),
        )
        .route("/subscribe", post(subscribers::subscribe))
        .route("/subscribers", get(subscribers::list_subscribers))
        .route(
            "/subscribers/import",
            post(subscribers::import_subscribers),
        )
        .route(
            "/subscribers/{id}/tags",
            get(subscribers::get_subscriber_tags).post(subscribers::apply_subscriber_tag),
        )
        .route(
            "/subscribers/{id}/tags/{tag_id}",
            axum::routing::delete(subscribers::remove_subscriber_tag),
        )
}

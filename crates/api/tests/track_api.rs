//! Integration tests for the public tracking endpoints.
//!
//! These endpoints must never fail visibly: whatever the parameters,
//! the client gets its pixel or redirect.

mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, get};
use sqlx::PgPool;

use palco_db::repositories::{CampaignRepo, RecipientRepo, SubscriberRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_recipient(pool: &PgPool) -> (i64, i64) {
    let subscriber = SubscriberRepo::create_or_reactivate(pool, "ana@example.com", None, None)
        .await
        .unwrap()
        .id;
    let campaign = CampaignRepo::create(pool, "Agenda", "<p>oi</p>", None, "all", 1)
        .await
        .unwrap()
        .id;
    RecipientRepo::record_sent(pool, campaign, subscriber).await.unwrap();
    (campaign, subscriber)
}

// ---------------------------------------------------------------------------
// Open pixel
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_returns_gif_and_counts_first_open_once(pool: PgPool) {
    let (cid, sid) = seed_recipient(&pool).await;
    let app = common::build_test_app(pool.clone());

    let response = get(app.clone(), &format!("/api/v1/track/open?cid={cid}&sid={sid}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate"
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"GIF89a"), "body must be a GIF image");

    let opened_first = RecipientRepo::find(&pool, cid, sid).await.unwrap().unwrap().opened_at;
    assert!(opened_first.is_some());

    // Second open: pixel still served, nothing double-counted.
    let response = get(app, &format!("/api/v1/track/open?cid={cid}&sid={sid}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let recipient = RecipientRepo::find(&pool, cid, sid).await.unwrap().unwrap();
    assert_eq!(recipient.opened_at, opened_first, "first open's timestamp survives");

    let campaign = CampaignRepo::find_by_id(&pool, cid).await.unwrap().unwrap();
    assert_eq!(campaign.opened_count, 1, "counter incremented at most once");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_with_missing_or_bogus_ids_still_serves_the_pixel(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in [
        "/api/v1/track/open",
        "/api/v1/track/open?cid=7",
        "/api/v1/track/open?cid=abc&sid=xyz",
        "/api/v1/track/open?cid=7&sid=999999",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    }
}

// ---------------------------------------------------------------------------
// Click redirect
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn click_redirects_and_records_cumulatively(pool: PgPool) {
    let (cid, sid) = seed_recipient(&pool).await;
    let app = common::build_test_app(pool.clone());

    let target = "https%3A%2F%2Fshows.example.com%2Fagenda";
    let uri = format!("/api/v1/track/click?cid={cid}&sid={sid}&url={target}");

    for _ in 0..3 {
        let response = get(app.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://shows.example.com/agenda"
        );
    }

    // Clicks are cumulative: three calls, three audit rows, counter +3.
    assert_eq!(RecipientRepo::click_count(&pool, cid).await.unwrap(), 3);

    let campaign = CampaignRepo::find_by_id(&pool, cid).await.unwrap().unwrap();
    assert_eq!(campaign.clicked_count, 3);

    let recipient = RecipientRepo::find(&pool, cid, sid).await.unwrap().unwrap();
    assert!(recipient.clicked_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn click_without_params_redirects_without_recording(pool: PgPool) {
    let (cid, _sid) = seed_recipient(&pool).await;
    let app = common::build_test_app(pool.clone());

    // No url: fall back to "/", record nothing.
    let response = get(app.clone(), &format!("/api/v1/track/click?cid={cid}&sid=1")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/");

    // No ids: redirect to the url, record nothing.
    let response = get(
        app,
        "/api/v1/track/click?url=https%3A%2F%2Fshows.example.com",
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "https://shows.example.com");

    assert_eq!(RecipientRepo::click_count(&pool, cid).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Unsubscribe
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsubscribe_deactivates_and_is_idempotent(pool: PgPool) {
    let (cid, sid) = seed_recipient(&pool).await;
    let app = common::build_test_app(pool.clone());

    let uri = format!("/api/v1/track/unsubscribe?sid={sid}&cid={cid}&reason=too-many");

    for _ in 0..2 {
        let response = get(app.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "http://localhost:5173/newsletter/unsubscribed"
        );

        let subscriber = SubscriberRepo::find_by_id(&pool, sid).await.unwrap().unwrap();
        assert!(!subscriber.is_active);
        assert_eq!(subscriber.unsubscribe_reason.as_deref(), Some("too-many"));
    }

    // The audit trail logs each call that carried a campaign id.
    let events: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM unsubscribe_events WHERE subscriber_id = $1")
            .bind(sid)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(events.0, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsubscribe_without_sid_redirects_home(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/track/unsubscribe").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "http://localhost:5173");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsubscribe_unknown_subscriber_redirects_home(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/track/unsubscribe?sid=999999").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "http://localhost:5173");
}

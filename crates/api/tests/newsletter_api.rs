//! Integration tests for campaign listing and analytics endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{admin_token, body_json, editor_token, request};
use serde_json::json;
use sqlx::PgPool;

use palco_db::repositories::{CampaignRepo, RecipientRepo, SubscriberRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed a campaign with `sent` recipients, of which `opened` have opened.
async fn seed_campaign_with_activity(pool: &PgPool, sent: usize, opened: usize) -> i64 {
    let campaign = CampaignRepo::create(pool, "Agenda", "<p>oi</p>", None, "all", sent as i32)
        .await
        .unwrap()
        .id;

    for i in 0..sent {
        let subscriber =
            SubscriberRepo::create_or_reactivate(pool, &format!("s{i}@example.com"), None, None)
                .await
                .unwrap()
                .id;
        RecipientRepo::record_sent(pool, campaign, subscriber).await.unwrap();
        if i < opened {
            RecipientRepo::mark_opened_once(pool, campaign, subscriber).await.unwrap();
            CampaignRepo::increment_opened(pool, campaign).await.unwrap();
        }
    }

    CampaignRepo::finalize(pool, campaign, sent as i32).await.unwrap();
    campaign
}

// ---------------------------------------------------------------------------
// Campaign listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn campaign_list_includes_derived_rates(pool: PgPool) {
    seed_campaign_with_activity(&pool, 4, 2).await;
    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::GET,
        "/api/v1/newsletter/campaigns",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let campaign = &json["data"][0];
    assert_eq!(campaign["status"], "sent");
    assert_eq!(campaign["total_recipients"], 4);
    assert_eq!(campaign["opened_count"], 2);
    assert_eq!(campaign["open_rate"], "50.00");
    assert_eq!(campaign["click_rate"], "0.00");
    assert!(
        campaign.get("content").is_none(),
        "the listing projection omits the full HTML body"
    );
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn analytics_for_unknown_campaign_returns_404(pool: PgPool) {
    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        "/api/v1/newsletter/analytics",
        Some(&token),
        Some(json!({"campaign_id": 999999, "timeframe": "day"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analytics_computes_rates_over_all_time(pool: PgPool) {
    let campaign = seed_campaign_with_activity(&pool, 10, 4).await;
    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        "/api/v1/newsletter/analytics",
        Some(&token),
        Some(json!({"campaign_id": campaign})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["timeframe"], "all");
    assert_eq!(json["data"]["stats"]["total_sent"], 10);
    assert_eq!(json["data"]["stats"]["total_opened"], 4);
    assert_eq!(json["data"]["stats"]["open_rate"], "40.00");
    assert_eq!(json["data"]["campaign"]["id"], campaign);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analytics_timeframe_excludes_old_sends(pool: PgPool) {
    let campaign = seed_campaign_with_activity(&pool, 3, 0).await;

    // Push one send outside the 1-day window.
    sqlx::query(
        "UPDATE campaign_recipients SET sent_at = NOW() - INTERVAL '3 days' \
         WHERE campaign_id = $1 AND subscriber_id = ( \
             SELECT subscriber_id FROM campaign_recipients \
             WHERE campaign_id = $1 ORDER BY subscriber_id LIMIT 1)",
    )
    .bind(campaign)
    .execute(&pool)
    .await
    .unwrap();

    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        "/api/v1/newsletter/analytics",
        Some(&token),
        Some(json!({"campaign_id": campaign, "timeframe": "day"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["timeframe"], "day");
    assert_eq!(
        json["data"]["stats"]["total_sent"], 2,
        "the 3-day-old send falls outside the window"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn analytics_unknown_timeframe_means_all_time(pool: PgPool) {
    let campaign = seed_campaign_with_activity(&pool, 2, 1).await;
    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        "/api/v1/newsletter/analytics",
        Some(&token),
        Some(json!({"campaign_id": campaign, "timeframe": "quarter"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["timeframe"], "all");
    assert_eq!(json["data"]["stats"]["total_sent"], 2);
}

// ---------------------------------------------------------------------------
// Send without SMTP configured
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn send_without_smtp_configured_is_a_500(pool: PgPool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        "/api/v1/newsletter/send",
        Some(&token),
        Some(json!({"subject": "s", "content": "c", "audience": "all"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resume_requires_admin(pool: PgPool) {
    let campaign = seed_campaign_with_activity(&pool, 1, 0).await;
    let token = editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = request(
        app,
        Method::POST,
        &format!("/api/v1/newsletter/campaigns/{campaign}/resume"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

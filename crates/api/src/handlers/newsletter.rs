//! Handlers for campaign composition, listing, and analytics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use palco_core::audience::Audience;
use palco_core::error::CoreError;
use palco_core::stats::{CampaignStats, Timeframe};
use palco_core::types::DbId;
use palco_db::models::campaign::{AnalyticsRequest, CampaignSummary, SendCampaignRequest};
use palco_db::repositories::{CampaignRepo, RecipientRepo};
use palco_mailer::SendInput;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct AnalyticsResponse {
    campaign: CampaignSummary,
    stats: CampaignStats,
    timeframe: &'static str,
}

/// POST /api/v1/newsletter/send
///
/// Compose and send a campaign to the resolved audience. Admin only.
/// Per-recipient failures are aggregated in the response, never raised.
pub async fn send_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<SendCampaignRequest>,
) -> AppResult<impl IntoResponse> {
    let sender = state.sender.as_ref().ok_or_else(|| {
        AppError::InternalError("Email delivery is not configured (SMTP_HOST unset)".into())
    })?;

    let audience = Audience::parse(input.audience.as_deref().unwrap_or_default());
    let outcome = sender
        .send(
            &state.pool,
            SendInput {
                subject: input.subject,
                content: input.content,
                preview: input.preview,
                audience,
            },
        )
        .await?;

    tracing::info!(
        campaign_id = outcome.campaign_id,
        sent = outcome.sent,
        failed = outcome.failed,
        user_id = admin.user_id,
        "Campaign sent",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/newsletter/campaigns/{id}/resume
///
/// Resume an interrupted send. Recipients that already received the
/// campaign are skipped. Admin only.
pub async fn resume_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let sender = state.sender.as_ref().ok_or_else(|| {
        AppError::InternalError("Email delivery is not configured (SMTP_HOST unset)".into())
    })?;

    let outcome = sender.resume(&state.pool, campaign_id).await?;

    tracing::info!(
        campaign_id,
        sent = outcome.sent,
        skipped = outcome.skipped,
        user_id = admin.user_id,
        "Campaign resumed",
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/newsletter/campaigns
///
/// List all campaigns, newest first, with derived open/click rates.
pub async fn list_campaigns(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let campaigns = CampaignRepo::list_all(&state.pool).await?;
    let summaries: Vec<CampaignSummary> = campaigns.into_iter().map(Into::into).collect();

    Ok(Json(DataResponse { data: summaries }))
}

/// POST /api/v1/newsletter/analytics
///
/// Aggregate per-recipient activity for one campaign over a timeframe.
/// The timeframe bounds `sent_at` from below; unknown keywords mean
/// all-time.
pub async fn campaign_analytics(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AnalyticsRequest>,
) -> AppResult<impl IntoResponse> {
    let campaign = CampaignRepo::find_by_id(&state.pool, input.campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: input.campaign_id,
        }))?;

    let timeframe = Timeframe::parse(input.timeframe.as_deref().unwrap_or_default());
    let since = timeframe.cutoff(chrono::Utc::now());

    let rows = RecipientRepo::activity(&state.pool, campaign.id, since).await?;
    let stats = CampaignStats::compute(&rows);

    Ok(Json(DataResponse {
        data: AnalyticsResponse {
            campaign: campaign.into(),
            stats,
            timeframe: timeframe.as_str(),
        },
    }))
}

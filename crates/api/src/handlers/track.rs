//! Public tracking endpoints: open pixel, click redirect, unsubscribe.
//!
//! These handlers never fail visibly. A broken tracking write must not
//! break email rendering or link navigation, so every error is logged
//! server-side and the client still gets its pixel or redirect.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use serde::Deserialize;
use sqlx::PgPool;

use palco_core::types::DbId;
use palco_db::repositories::{CampaignRepo, RecipientRepo, SubscriberRepo};

use crate::state::AppState;

/// A 1x1 transparent GIF (43 bytes).
static TRANSPARENT_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
    0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, // 1x1, global color table
    0x00, 0x00, 0x00, 0xff, 0xff, 0xff, // palette: black, white
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, // transparency
    0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // image descriptor
    0x02, 0x02, 0x44, 0x01, 0x00, // image data
    0x3b, // trailer
];

// The id parameters are kept as raw strings and parsed leniently: a
// malformed `cid=abc` must not trip the Query extractor into a 400,
// it must still get its pixel or redirect.

#[derive(Debug, Deserialize)]
pub struct OpenParams {
    cid: Option<String>,
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClickParams {
    cid: Option<String>,
    sid: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeParams {
    sid: Option<String>,
    cid: Option<String>,
    reason: Option<String>,
}

/// Parse an id parameter, treating malformed values as absent.
fn parse_id(raw: Option<&str>) -> Option<DbId> {
    raw.and_then(|v| v.parse().ok())
}

/// GET /api/v1/track/open?cid&sid
///
/// Record the first open for a recipient and bump the campaign counter
/// at most once. Always answers with the pixel, whatever happens: the
/// conditional update in the repository means a second (or concurrent)
/// open of the same email cannot double-count.
pub async fn track_open(
    State(state): State<AppState>,
    Query(params): Query<OpenParams>,
) -> impl IntoResponse {
    if let (Some(cid), Some(sid)) = (
        parse_id(params.cid.as_deref()),
        parse_id(params.sid.as_deref()),
    ) {
        match RecipientRepo::mark_opened_once(&state.pool, cid, sid).await {
            Ok(true) => {
                if let Err(e) = CampaignRepo::increment_opened(&state.pool, cid).await {
                    tracing::error!(cid, sid, error = %e, "Failed to bump opened counter");
                }
                tracing::debug!(cid, sid, "Open recorded");
            }
            Ok(false) => {
                // Already opened, or no such recipient row. Either way
                // there is nothing to count.
            }
            Err(e) => {
                tracing::error!(cid, sid, error = %e, "Failed to record open");
            }
        }
    }

    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate",
            ),
        ],
        TRANSPARENT_GIF,
    )
}

/// GET /api/v1/track/click?cid&sid&url
///
/// Record a click (clicked_at overwrite, audit row, counter bump) and
/// redirect to the original URL. Clicks are cumulative by design: every
/// call appends an audit row and bumps the counter. Missing parameters
/// skip recording but never block navigation.
pub async fn track_click(
    State(state): State<AppState>,
    Query(params): Query<ClickParams>,
) -> Redirect {
    let target = params.url.as_deref().unwrap_or("/").to_string();

    if let (Some(cid), Some(sid), Some(url)) = (
        parse_id(params.cid.as_deref()),
        parse_id(params.sid.as_deref()),
        params.url.as_deref(),
    ) {
        if let Err(e) = record_click(&state.pool, cid, sid, url).await {
            tracing::error!(cid, sid, error = %e, "Failed to record click");
        } else {
            tracing::debug!(cid, sid, "Click recorded");
        }
    }

    Redirect::temporary(&target)
}

/// GET /api/v1/track/unsubscribe?sid&cid?&reason?
///
/// Deactivate the subscriber (idempotent), log the audit event when the
/// originating campaign is known, and redirect to the confirmation
/// page. Internal errors redirect to the home page instead of showing
/// anything to the subscriber.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(params): Query<UnsubscribeParams>,
) -> Redirect {
    let home = state.config.public_site_url.clone();

    let Some(sid) = parse_id(params.sid.as_deref()) else {
        return Redirect::temporary(&home);
    };

    let cid = parse_id(params.cid.as_deref());
    match record_unsubscribe(&state.pool, sid, cid, params.reason.as_deref()).await {
        Ok(true) => {
            tracing::info!(sid, cid, "Subscriber unsubscribed");
            Redirect::temporary(&format!("{home}/newsletter/unsubscribed"))
        }
        Ok(false) => {
            tracing::warn!(sid, "Unsubscribe for unknown subscriber");
            Redirect::temporary(&home)
        }
        Err(e) => {
            tracing::error!(sid, error = %e, "Failed to record unsubscribe");
            Redirect::temporary(&home)
        }
    }
}

/// The three click writes, in order: recipient summary, audit row,
/// counter. A foreign-key failure on forged ids aborts before the
/// counter is touched; any drift that slips through is repaired by the
/// reconciliation job.
async fn record_click(
    pool: &PgPool,
    cid: DbId,
    sid: DbId,
    url: &str,
) -> Result<(), sqlx::Error> {
    RecipientRepo::mark_clicked(pool, cid, sid).await?;
    RecipientRepo::record_click(pool, cid, sid, url).await?;
    CampaignRepo::increment_clicked(pool, cid).await?;
    Ok(())
}

/// Deactivate the subscriber and append the audit event.
///
/// Returns `false` when the subscriber does not exist.
async fn record_unsubscribe(
    pool: &PgPool,
    sid: DbId,
    cid: Option<DbId>,
    reason: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let found = SubscriberRepo::deactivate(pool, sid, reason).await?;

    if found {
        if let Some(cid) = cid {
            RecipientRepo::record_unsubscribe_event(pool, sid, Some(cid), reason).await?;
        }
    }

    Ok(found)
}

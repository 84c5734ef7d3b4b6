//! Campaign models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use palco_core::types::{DbId, Timestamp};

/// Campaign lifecycle: created as `sending`, finalized as `sent`.
pub const CAMPAIGN_STATUS_SENDING: &str = "sending";
pub const CAMPAIGN_STATUS_SENT: &str = "sent";

/// A row from the `campaigns` table.
///
/// `opened_count` and `clicked_count` are read caches over the
/// recipient rows and the click log; the reconciliation job recomputes
/// them, so readers must treat them as approximations between runs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub subject: String,
    pub content: String,
    pub preview_text: Option<String>,
    pub audience: String,
    pub status: String,
    pub sent_at: Timestamp,
    pub total_recipients: i32,
    pub opened_count: i32,
    pub clicked_count: i32,
    pub created_at: Timestamp,
}

/// Listing row for the dashboard: campaign plus derived rates.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub id: DbId,
    pub subject: String,
    pub audience: String,
    pub status: String,
    pub sent_at: Timestamp,
    pub total_recipients: i32,
    pub opened_count: i32,
    pub clicked_count: i32,
    /// Opens over sends, two-decimal string.
    pub open_rate: String,
    /// Clicks over opens, two-decimal string.
    pub click_rate: String,
}

impl From<Campaign> for CampaignSummary {
    fn from(c: Campaign) -> Self {
        let open_rate =
            palco_core::stats::percentage(c.opened_count as i64, c.total_recipients as i64);
        let click_rate =
            palco_core::stats::percentage(c.clicked_count as i64, c.opened_count as i64);
        Self {
            id: c.id,
            subject: c.subject,
            audience: c.audience,
            status: c.status,
            sent_at: c.sent_at,
            total_recipients: c.total_recipients,
            opened_count: c.opened_count,
            clicked_count: c.clicked_count,
            open_rate,
            click_rate,
        }
    }
}

/// DTO for composing and sending a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct SendCampaignRequest {
    pub subject: String,
    /// HTML template; `{{name}}` is replaced per recipient.
    pub content: String,
    /// Plain-text fallback shown by clients that refuse HTML.
    pub preview: Option<String>,
    /// Audience name; unknown values mean "all".
    pub audience: Option<String>,
}

/// DTO for the analytics endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsRequest {
    pub campaign_id: DbId,
    /// `day` / `week` / `month` / `year`; anything else is all-time.
    pub timeframe: Option<String>,
}

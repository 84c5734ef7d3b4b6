//! Per-recipient send state, click audit log, and unsubscribe audit
//! trail.

use serde::Serialize;
use sqlx::FromRow;

use palco_core::types::{DbId, Timestamp};

/// A row from the `campaign_recipients` table.
///
/// Created once per successful send; `opened_at` is written at most
/// once (first open wins), `clicked_at` tracks the most recent click.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignRecipient {
    pub id: DbId,
    pub campaign_id: DbId,
    pub subscriber_id: DbId,
    pub sent_at: Timestamp,
    pub opened_at: Option<Timestamp>,
    pub clicked_at: Option<Timestamp>,
}

/// A row from the append-only `link_clicks` log.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkClick {
    pub id: DbId,
    pub campaign_id: DbId,
    pub subscriber_id: DbId,
    pub url: String,
    pub clicked_at: Timestamp,
}

/// A row from the append-only `unsubscribe_events` audit trail.
///
/// The subscriber row carries the current unsubscribe state; this table
/// remembers which campaign triggered it and why.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnsubscribeEvent {
    pub id: DbId,
    pub subscriber_id: DbId,
    pub campaign_id: Option<DbId>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

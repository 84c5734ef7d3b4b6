//! Repository for `campaign_recipients`, the `link_clicks` log, and the
//! `unsubscribe_events` audit trail.

use sqlx::PgPool;

use palco_core::stats::RecipientActivity;
use palco_core::types::{DbId, Timestamp};

use crate::models::recipient::{CampaignRecipient, LinkClick, UnsubscribeEvent};

/// Column list for `campaign_recipients` queries.
const COLUMNS: &str = "id, campaign_id, subscriber_id, sent_at, opened_at, clicked_at";

/// Provides send/open/click state tracking per recipient.
pub struct RecipientRepo;

impl RecipientRepo {
    /// Record a successful send.
    ///
    /// The unique (campaign, subscriber) key makes this idempotent;
    /// returns `false` when a row already existed, which a resumed send
    /// treats as "already delivered".
    pub async fn record_sent(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO campaign_recipients (campaign_id, subscriber_id) \
             VALUES ($1, $2) \
             ON CONFLICT (campaign_id, subscriber_id) DO NOTHING",
        )
        .bind(campaign_id)
        .bind(subscriber_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether this campaign already went to this subscriber.
    pub async fn already_sent(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM campaign_recipients \
                 WHERE campaign_id = $1 AND subscriber_id = $2)",
        )
        .bind(campaign_id)
        .bind(subscriber_id)
        .fetch_one(pool)
        .await
    }

    /// Fetch one recipient row.
    pub async fn find(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<Option<CampaignRecipient>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_recipients \
             WHERE campaign_id = $1 AND subscriber_id = $2"
        );
        sqlx::query_as::<_, CampaignRecipient>(&query)
            .bind(campaign_id)
            .bind(subscriber_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the first open for a recipient.
    ///
    /// A single conditional update: only the first call flips
    /// `opened_at`, so concurrent opens of the same email cannot
    /// double-count. Returns `true` exactly when this call was the
    /// first open; the caller bumps the campaign counter on `true`.
    pub async fn mark_opened_once(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaign_recipients SET opened_at = NOW() \
             WHERE campaign_id = $1 AND subscriber_id = $2 AND opened_at IS NULL",
        )
        .bind(campaign_id)
        .bind(subscriber_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a click on the recipient row. Always overwrites
    /// `clicked_at` so it reflects the most recent click.
    ///
    /// Returns `true` when a recipient row existed to update.
    pub async fn mark_clicked(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaign_recipients SET clicked_at = NOW() \
             WHERE campaign_id = $1 AND subscriber_id = $2",
        )
        .bind(campaign_id)
        .bind(subscriber_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a row to the click log.
    pub async fn record_click(
        pool: &PgPool,
        campaign_id: DbId,
        subscriber_id: DbId,
        url: &str,
    ) -> Result<LinkClick, sqlx::Error> {
        sqlx::query_as::<_, LinkClick>(
            "INSERT INTO link_clicks (campaign_id, subscriber_id, url) \
             VALUES ($1, $2, $3) \
             RETURNING id, campaign_id, subscriber_id, url, clicked_at",
        )
        .bind(campaign_id)
        .bind(subscriber_id)
        .bind(url)
        .fetch_one(pool)
        .await
    }

    /// Count logged clicks for a campaign.
    pub async fn click_count(pool: &PgPool, campaign_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(pool)
            .await
    }

    /// Append a row to the unsubscribe audit trail.
    pub async fn record_unsubscribe_event(
        pool: &PgPool,
        subscriber_id: DbId,
        campaign_id: Option<DbId>,
        reason: Option<&str>,
    ) -> Result<UnsubscribeEvent, sqlx::Error> {
        sqlx::query_as::<_, UnsubscribeEvent>(
            "INSERT INTO unsubscribe_events (subscriber_id, campaign_id, reason) \
             VALUES ($1, $2, $3) \
             RETURNING id, subscriber_id, campaign_id, reason, created_at",
        )
        .bind(subscriber_id)
        .bind(campaign_id)
        .bind(reason)
        .fetch_one(pool)
        .await
    }

    /// Load the send/open/click activity for a campaign, optionally
    /// bounded below by `sent_at`.
    pub async fn activity(
        pool: &PgPool,
        campaign_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<RecipientActivity>, sqlx::Error> {
        let rows: Vec<(Timestamp, Option<Timestamp>, Option<Timestamp>)> = match since {
            Some(cutoff) => {
                sqlx::query_as(
                    "SELECT sent_at, opened_at, clicked_at \
                     FROM campaign_recipients \
                     WHERE campaign_id = $1 AND sent_at >= $2",
                )
                .bind(campaign_id)
                .bind(cutoff)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT sent_at, opened_at, clicked_at \
                     FROM campaign_recipients \
                     WHERE campaign_id = $1",
                )
                .bind(campaign_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(sent_at, opened_at, clicked_at)| RecipientActivity {
                sent_at,
                opened_at,
                clicked_at,
            })
            .collect())
    }

    /// Count recipient rows for a campaign.
    pub async fn count_for_campaign(pool: &PgPool, campaign_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM campaign_recipients WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(pool)
            .await
    }
}

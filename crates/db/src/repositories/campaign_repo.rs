//! Repository for the `campaigns` table.
//!
//! Campaign counters (`opened_count`, `clicked_count`) are unconditional
//! atomic increments at the database level; the reconciliation method
//! recomputes them from the recipient rows and the click log.

use sqlx::PgPool;

use palco_core::types::DbId;

use crate::models::campaign::{Campaign, CAMPAIGN_STATUS_SENT};

/// Column list for `campaigns` queries.
const COLUMNS: &str = "\
    id, subject, content, preview_text, audience, status, sent_at, \
    total_recipients, opened_count, clicked_count, created_at";

/// Provides CRUD operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create a campaign in the `sending` state with counters zeroed.
    ///
    /// `total_recipients` starts as the resolved audience size and is
    /// corrected to the successful-send count by [`Self::finalize`].
    pub async fn create(
        pool: &PgPool,
        subject: &str,
        content: &str,
        preview_text: Option<&str>,
        audience: &str,
        total_recipients: i32,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (subject, content, preview_text, audience, total_recipients) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(subject)
            .bind(content)
            .bind(preview_text)
            .bind(audience)
            .bind(total_recipients)
            .fetch_one(pool)
            .await
    }

    /// Find a campaign by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all campaigns, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns ORDER BY sent_at DESC, id DESC");
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }

    /// Finalize a campaign after the send loop: status `sent` and
    /// `total_recipients` corrected to the successful-send count.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        successful_sends: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = $2, total_recipients = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(CAMPAIGN_STATUS_SENT)
        .bind(successful_sends)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the opened counter.
    pub async fn increment_opened(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE campaigns SET opened_count = opened_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Atomically bump the clicked counter.
    pub async fn increment_clicked(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE campaigns SET clicked_count = clicked_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Recompute the counter caches from the source-of-truth rows.
    ///
    /// `opened_count` is the number of recipient rows with an open;
    /// `clicked_count` is the total number of logged clicks (clicks are
    /// cumulative). Returns how many campaign rows were corrected.
    pub async fn reconcile_counters(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let opened = sqlx::query(
            "UPDATE campaigns c SET opened_count = agg.cnt \
             FROM ( \
                 SELECT c2.id, COUNT(r.opened_at)::int AS cnt \
                 FROM campaigns c2 \
                 LEFT JOIN campaign_recipients r \
                     ON r.campaign_id = c2.id AND r.opened_at IS NOT NULL \
                 GROUP BY c2.id \
             ) agg \
             WHERE agg.id = c.id AND c.opened_count <> agg.cnt",
        )
        .execute(pool)
        .await?;

        let clicked = sqlx::query(
            "UPDATE campaigns c SET clicked_count = agg.cnt \
             FROM ( \
                 SELECT c2.id, COUNT(l.id)::int AS cnt \
                 FROM campaigns c2 \
                 LEFT JOIN link_clicks l ON l.campaign_id = c2.id \
                 GROUP BY c2.id \
             ) agg \
             WHERE agg.id = c.id AND c.clicked_count <> agg.cnt",
        )
        .execute(pool)
        .await?;

        Ok(opened.rows_affected() + clicked.rows_affected())
    }
}

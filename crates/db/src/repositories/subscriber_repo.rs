//! Repository for the `subscribers` table.
//!
//! Covers signup, listing, audience resolution for campaign sends,
//! deactivation (unsubscribe), and CSV import batches.

use sqlx::PgPool;

use palco_core::audience::{Audience, ENGAGED_WINDOW_DAYS, NEW_WINDOW_DAYS};
use palco_core::import::ParsedSubscriber;
use palco_core::types::DbId;

use crate::models::subscriber::{ImportOutcome, Subscriber, SubscriberInfo, SubscriberListParams};

/// Column list for `subscribers` queries.
const COLUMNS: &str = "\
    id, email, name, is_active, source, created_at, \
    unsubscribed_at, unsubscribe_reason";

/// Default page size for subscriber listing.
const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for subscriber listing.
const MAX_LIMIT: i64 = 500;

/// Provides CRUD operations for subscribers.
pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Create a subscriber, or reactivate an existing one with the same
    /// email.
    ///
    /// Re-subscribing after an unsubscribe clears the unsubscribe state;
    /// the audit trail in `unsubscribe_events` is unaffected. The email
    /// must already be normalized (lower-cased, trimmed).
    pub async fn create_or_reactivate(
        pool: &PgPool,
        email: &str,
        name: Option<&str>,
        source: Option<&str>,
    ) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscribers (email, name, source) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO UPDATE SET \
                 is_active = TRUE, \
                 name = COALESCE(EXCLUDED.name, subscribers.name), \
                 unsubscribed_at = NULL, \
                 unsubscribe_reason = NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(email)
            .bind(name)
            .bind(source)
            .fetch_one(pool)
            .await
    }

    /// Find a subscriber by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscribers WHERE id = $1");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a subscriber by normalized email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscribers WHERE email = $1");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List subscribers, newest first, with pagination.
    pub async fn list(
        pool: &PgPool,
        params: &SubscriberListParams,
    ) -> Result<Vec<Subscriber>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let filter = if params.active_only.unwrap_or(false) {
            "WHERE is_active"
        } else {
            ""
        };

        let query = format!(
            "SELECT {COLUMNS} FROM subscribers {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Resolve an audience into the subscribers a campaign goes to.
    ///
    /// Only active subscribers ever match. Engagement is defined by
    /// opens on previous campaigns within the last
    /// [`ENGAGED_WINDOW_DAYS`] days.
    pub async fn resolve_audience(
        pool: &PgPool,
        audience: Audience,
    ) -> Result<Vec<SubscriberInfo>, sqlx::Error> {
        let now = chrono::Utc::now();

        match audience {
            Audience::Engaged => {
                let cutoff = now - chrono::Duration::days(ENGAGED_WINDOW_DAYS);
                sqlx::query_as::<_, SubscriberInfo>(
                    "SELECT id, email, name FROM subscribers s \
                     WHERE s.is_active AND EXISTS ( \
                         SELECT 1 FROM campaign_recipients r \
                         WHERE r.subscriber_id = s.id AND r.opened_at >= $1) \
                     ORDER BY s.id",
                )
                .bind(cutoff)
                .fetch_all(pool)
                .await
            }
            Audience::Inactive => {
                let cutoff = now - chrono::Duration::days(ENGAGED_WINDOW_DAYS);
                sqlx::query_as::<_, SubscriberInfo>(
                    "SELECT id, email, name FROM subscribers s \
                     WHERE s.is_active AND NOT EXISTS ( \
                         SELECT 1 FROM campaign_recipients r \
                         WHERE r.subscriber_id = s.id AND r.opened_at >= $1) \
                     ORDER BY s.id",
                )
                .bind(cutoff)
                .fetch_all(pool)
                .await
            }
            Audience::New => {
                let cutoff = now - chrono::Duration::days(NEW_WINDOW_DAYS);
                sqlx::query_as::<_, SubscriberInfo>(
                    "SELECT id, email, name FROM subscribers \
                     WHERE is_active AND created_at >= $1 \
                     ORDER BY id",
                )
                .bind(cutoff)
                .fetch_all(pool)
                .await
            }
            Audience::All => {
                sqlx::query_as::<_, SubscriberInfo>(
                    "SELECT id, email, name FROM subscribers \
                     WHERE is_active \
                     ORDER BY id",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Deactivate a subscriber (unsubscribe).
    ///
    /// Idempotent: a second call leaves the subscriber inactive with the
    /// original unsubscribe timestamp. Returns `false` when no
    /// subscriber with the given ID exists.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
        reason: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscribers SET \
                 is_active = FALSE, \
                 unsubscribed_at = COALESCE(unsubscribed_at, NOW()), \
                 unsubscribe_reason = COALESCE(unsubscribe_reason, $2) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a batch of validated import rows.
    ///
    /// Emails that already exist are skipped rather than reactivated:
    /// an import must never undo an unsubscribe.
    pub async fn import_batch(
        pool: &PgPool,
        rows: &[ParsedSubscriber],
    ) -> Result<ImportOutcome, sqlx::Error> {
        let mut outcome = ImportOutcome::default();

        for row in rows {
            let result = sqlx::query(
                "INSERT INTO subscribers (email, name, source) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (email) DO NOTHING",
            )
            .bind(&row.email)
            .bind(row.name.as_deref())
            .bind(row.source.as_deref().or(Some("import")))
            .execute(pool)
            .await?;

            if result.rows_affected() > 0 {
                outcome.imported += 1;
            } else {
                outcome.skipped += 1;
            }
        }

        Ok(outcome)
    }
}

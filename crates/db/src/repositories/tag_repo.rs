//! Repository for the `tags` and `subscriber_tags` tables.
//!
//! Tag names are unique; attaching a tag to a subscriber is idempotent
//! through the composite unique key on the association row.

use sqlx::PgPool;

use palco_core::types::DbId;

use crate::models::tag::{SubscriberTagInfo, Tag};

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, color, description, created_at";

/// Default tag color when the dashboard does not pick one.
const DEFAULT_COLOR: &str = "#6b7280";

/// Provides CRUD operations for tags and subscriber-tag associations.
pub struct TagRepo;

impl TagRepo {
    /// Create a tag. A duplicate name violates `uq_tags_name` and
    /// surfaces as a conflict to the caller.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, color, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name.trim())
            .bind(color.unwrap_or(DEFAULT_COLOR))
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// Find a tag by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all tags, alphabetically.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name");
        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    /// Update a tag's `color` and/or `description`.
    ///
    /// Returns `None` if no tag with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET \
                 color = COALESCE($2, color), \
                 description = COALESCE($3, description) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(color)
            .bind(description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag by ID. Cascade deletes all subscriber associations.
    ///
    /// Returns `true` if a tag was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Subscriber-tag associations
    // -----------------------------------------------------------------------

    /// Attach a tag to a subscriber. Idempotent: returns `false` when
    /// the association already existed.
    pub async fn tag_subscriber(
        pool: &PgPool,
        subscriber_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO subscriber_tags (subscriber_id, tag_id) \
             VALUES ($1, $2) \
             ON CONFLICT (subscriber_id, tag_id) DO NOTHING",
        )
        .bind(subscriber_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach a tag from a subscriber.
    ///
    /// Returns `true` if an association was removed.
    pub async fn untag_subscriber(
        pool: &PgPool,
        subscriber_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM subscriber_tags \
             WHERE subscriber_id = $1 AND tag_id = $2",
        )
        .bind(subscriber_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all tags attached to a subscriber.
    pub async fn subscriber_tags(
        pool: &PgPool,
        subscriber_id: DbId,
    ) -> Result<Vec<SubscriberTagInfo>, sqlx::Error> {
        sqlx::query_as::<_, SubscriberTagInfo>(
            "SELECT t.id, t.name, t.color, st.added_at \
             FROM subscriber_tags st \
             JOIN tags t ON t.id = st.tag_id \
             WHERE st.subscriber_id = $1 \
             ORDER BY t.name",
        )
        .bind(subscriber_id)
        .fetch_all(pool)
        .await
    }
}

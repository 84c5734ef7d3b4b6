//! Tag and subscriber-tag models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use palco_core::types::{DbId, Timestamp};

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// A tag attached to a specific subscriber, with the association time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriberTagInfo {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub added_at: Timestamp,
}

/// DTO for creating a new tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating an existing tag. The name is immutable; segments
/// saved in campaign history keep meaning what they meant.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTag {
    pub color: Option<String>,
    pub description: Option<String>,
}

/// DTO for attaching a tag to a subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyTagRequest {
    pub tag_id: DbId,
}

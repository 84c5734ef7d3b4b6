//! Subscriber models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use palco_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `subscribers` table.
///
/// Subscribers are never hard-deleted: unsubscribing flips `is_active`
/// and stamps the unsubscribe fields, keeping the row for audit and
/// re-subscription.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    /// Free-text acquisition channel (e.g. `"website"`, `"import"`).
    pub source: Option<String>,
    pub created_at: Timestamp,
    pub unsubscribed_at: Option<Timestamp>,
    pub unsubscribe_reason: Option<String>,
}

/// The projection the campaign sender needs: just enough to address
/// and personalize one email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriberInfo {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a subscriber (signup form or dashboard).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriber {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

/// Query parameters for listing subscribers.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberListParams {
    /// Maximum results. Defaults to 100.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
    /// When `true`, only active subscribers are returned.
    pub active_only: Option<bool>,
}

/// Result summary for a CSV import batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportOutcome {
    /// Rows inserted.
    pub imported: i64,
    /// Rows skipped because the email already existed.
    pub skipped: i64,
}

//! Dashboard account models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use palco_core::types::{DbId, Timestamp};

/// A row from the `users` table. Never serialized to clients directly;
/// use [`UserInfo`] for responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// The client-safe projection of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// DTO for the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

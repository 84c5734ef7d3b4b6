//! Repository for the `users` table (dashboard accounts).

use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, password_hash, role, is_active, created_at";

/// Provides account lookup and creation for the dashboard login.
pub struct UserRepo;

impl UserRepo {
    /// Create an account with an already-hashed password.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Find an account by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}

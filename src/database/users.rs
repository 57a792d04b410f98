use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;

/// Store for user records. Every request re-resolves users through here;
/// nothing is cached in-process, so the database row is the single source
/// of truth for counters and the admin flag.
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store backed by the shared process-wide pool.
    pub fn shared() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool()?))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, api_call_count, is_admin, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, api_call_count, is_admin, created_at, updated_at
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Insert a new user with a zeroed counter and no admin rights.
    /// Returns `None` when the email is already registered; the conflict
    /// check and the insert are one statement so concurrent registrations
    /// of the same email cannot both succeed.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash)
             VALUES ($1, $2, $3)
             ON CONFLICT (email) DO NOTHING
             RETURNING id, email, password_hash, api_call_count, is_admin, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Replace the stored password hash. Returns false if the email is unknown.
    pub async fn update_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn promote_to_admin(&self, email: &str) -> Result<bool, DatabaseError> {
        let result =
            sqlx::query("UPDATE users SET is_admin = TRUE, updated_at = now() WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Zero the metered-call counter regardless of its current value.
    pub async fn reset_api_calls(&self, email: &str) -> Result<bool, DatabaseError> {
        let result =
            sqlx::query("UPDATE users SET api_call_count = 0, updated_at = now() WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, email: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check-and-increment for one metered call, as a single statement.
    /// The row lock taken by UPDATE serializes concurrent requests from the
    /// same user, so the ceiling is a hard cap on admitted calls: at or above
    /// the ceiling nothing is incremented and `None` comes back.
    ///
    /// `Some(count)` is the post-increment counter for the admitted call.
    pub async fn admit_metered_call(
        &self,
        email: &str,
        ceiling: i32,
    ) -> Result<Option<i32>, DatabaseError> {
        let count: Option<(i32,)> = sqlx::query_as(
            "UPDATE users
             SET api_call_count = api_call_count + 1, updated_at = now()
             WHERE email = $1 AND api_call_count < $2
             RETURNING api_call_count",
        )
        .bind(email)
        .bind(ceiling)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count.map(|(c,)| c))
    }
}

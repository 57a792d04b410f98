use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide connection pool for the user database. The pool is created
/// lazily: constructing it never touches the network, so the router can be
/// built (and exercised in tests) without a reachable Postgres.
pub struct DatabaseManager;

static POOL: OnceLock<PgPool> = OnceLock::new();

impl DatabaseManager {
    /// Get the shared pool, creating it on first use from DATABASE_URL.
    pub fn pool() -> Result<PgPool, DatabaseError> {
        if let Some(pool) = POOL.get() {
            return Ok(pool.clone());
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let db_config = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.acquire_timeout_secs))
            .connect_lazy(&url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        // Another task may have won the race; either pool is fine
        Ok(POOL.get_or_init(|| pool).clone())
    }

    /// Pings the database to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Bring the schema up to date at startup. The original system relied on
    /// its ORM's sync-on-boot; idempotent DDL is the equivalent here.
    pub async fn sync_schema() -> Result<(), DatabaseError> {
        let pool = Self::pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                api_call_count INTEGER NOT NULL DEFAULT 0,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS endpoint_access (
                user_id UUID REFERENCES users(id) ON DELETE CASCADE,
                route TEXT NOT NULL,
                method TEXT NOT NULL,
                count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS endpoint_access_lookup
            ON endpoint_access (route, method)
            "#,
        )
        .execute(&pool)
        .await?;

        info!("Database schema is up to date");
        Ok(())
    }
}

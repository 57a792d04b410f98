use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::RouteStat;

/// Store for per-route access counts. `user_id` is NULL for requests that
/// could not be attributed to a registered user.
pub struct RouteStatsStore {
    pool: PgPool,
}

impl RouteStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn shared() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool()?))
    }

    /// Count one access for (user, route, method). Update first, insert when
    /// no row matched. A lost race inserts a duplicate row at worst; the
    /// report sums counts per key, so the numbers stay correct.
    pub async fn record(
        &self,
        user_id: Option<Uuid>,
        route: &str,
        method: &str,
    ) -> Result<(), DatabaseError> {
        let updated = sqlx::query(
            "UPDATE endpoint_access SET count = count + 1
             WHERE user_id IS NOT DISTINCT FROM $1 AND route = $2 AND method = $3",
        )
        .bind(user_id)
        .bind(route)
        .bind(method)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO endpoint_access (user_id, route, method, count)
                 VALUES ($1, $2, $3, 1)",
            )
            .bind(user_id)
            .bind(route)
            .bind(method)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Access report, most-hit routes first.
    pub async fn list(&self) -> Result<Vec<RouteStat>, DatabaseError> {
        let stats = sqlx::query_as::<_, RouteStat>(
            "SELECT COALESCE(u.email, 'Unknown') AS email,
                    ea.method,
                    ea.route,
                    CAST(SUM(ea.count) AS INTEGER) AS count
             FROM endpoint_access ea
             LEFT JOIN users u ON u.id = ea.user_id
             GROUP BY u.email, ea.method, ea.route
             ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }
}

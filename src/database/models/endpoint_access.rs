use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the per-route access report: how many times a user (or an
/// anonymous caller) hit a route+method combination.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteStat {
    /// "Unknown" for requests that could not be attributed to a user
    pub email: String,
    pub method: String,
    pub route: String,
    pub count: i32,
}

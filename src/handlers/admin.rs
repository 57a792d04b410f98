use axum::extract::Path;
use serde_json::{json, Value};

use crate::database::models::RouteStat;
use crate::database::{RouteStatsStore, UserStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// PATCH /promote-user/:email - grant admin rights
///
/// Promoting an existing admin is a conflict, not a no-op, so callers can
/// tell a repeat click from a successful promotion.
pub async fn promote_user(Path(email): Path<String>) -> ApiResult<Value> {
    let store = UserStore::shared()?;
    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.is_admin {
        return Err(ApiError::conflict("User is already an admin"));
    }

    store.promote_to_admin(&email).await?;
    tracing::info!("User '{}' promoted to admin", email);
    Ok(ApiResponse::success(json!({
        "message": "User promoted to admin successfully"
    })))
}

/// DELETE /delete-user/:email - remove a user record
///
/// The user's still-valid tokens die at the auth middleware's store lookup.
pub async fn delete_user(Path(email): Path<String>) -> ApiResult<Value> {
    let store = UserStore::shared()?;
    if !store.delete(&email).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("User '{}' deleted", email);
    Ok(ApiResponse::success(json!({
        "message": "User deleted successfully"
    })))
}

/// PATCH /reset-api-call-count/:email - zero a user's metered-call counter
pub async fn reset_api_call_count(Path(email): Path<String>) -> ApiResult<Value> {
    let store = UserStore::shared()?;
    if !store.reset_api_calls(&email).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("API call count reset for '{}'", email);
    Ok(ApiResponse::success(json!({
        "message": "API call count has been reset!"
    })))
}

/// GET /api-route-stats - per-user, per-route access counts
pub async fn api_route_stats() -> ApiResult<Vec<RouteStat>> {
    let store = RouteStatsStore::shared()?;
    let stats = store.list().await?;
    Ok(ApiResponse::success(stats))
}

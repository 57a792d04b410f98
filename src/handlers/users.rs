use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::User;
use crate::database::UserStore;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /users - list registered users (password hashes are never serialized)
pub async fn list_users() -> ApiResult<Vec<User>> {
    let store = UserStore::shared()?;
    let users = store.list().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api-call-count - the caller's own metered-call counter
pub async fn api_call_count(Extension(current): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "count": current.0.api_call_count
    })))
}

/// GET /verify-token - succeeds iff the auth middleware resolved an identity
pub async fn verify_token(Extension(current): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "message": "Token is valid",
        "user": current.0
    })))
}

/// GET /verify-admin - succeeds iff the caller passed the admin gate
pub async fn verify_admin(Extension(current): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "message": "Admin token is valid",
        "user": current.0
    })))
}

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;

/// Admin authorization gate. Must be layered after `require_session`; the
/// check runs before any handler logic, so a non-admin gets 403 even when
/// the resource they were aiming at does not exist.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("You're not authorized to access this resource"))?;

    if !current.0.is_admin {
        tracing::debug!("User '{}' denied admin access", current.0.email);
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

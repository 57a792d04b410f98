use axum::{extract::Request, middleware::Next, response::Response};

use crate::config;
use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::database::UserStore;

/// The caller's counter value after this request was admitted. Metered
/// handlers echo it back so clients can show remaining quota.
#[derive(Clone, Copy, Debug)]
pub struct QuotaStanding {
    pub count: i32,
}

/// Quota middleware for metered routes. Must be layered after
/// `require_session`.
///
/// The admit decision re-reads the counter from the store rather than
/// trusting the record resolved at auth time, and the check and increment
/// happen in one statement, so N concurrent requests at ceiling-1 admit
/// exactly one call. Rejected requests never reach the downstream handler
/// and never move the counter.
pub async fn track_api_calls(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let email = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("You're not authorized to access this resource"))?
        .0
        .email
        .clone();

    let ceiling = config::config().quota.max_api_calls;
    let store = UserStore::shared()?;

    match store.admit_metered_call(&email, ceiling).await? {
        Some(count) => {
            request.extensions_mut().insert(QuotaStanding { count });
            Ok(next.run(request).await)
        }
        None => {
            // Not admitted: either the ceiling is reached or the user vanished
            // between auth and here
            if store.find_by_email(&email).await?.is_some() {
                tracing::debug!("User '{}' hit the metered call ceiling of {}", email, ceiling);
                Err(ApiError::quota_exceeded("You've exceeded your API call limit"))
            } else {
                Err(ApiError::unauthorized("You're not authorized to access this resource"))
            }
        }
    }
}

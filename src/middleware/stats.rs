use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::auth::{verify_token, TokenPurpose};
use crate::config;
use crate::database::{RouteStatsStore, UserStore};
use crate::middleware::auth::token_from_headers;

/// Global access-stats middleware. Counts every request against
/// (user, route, method), attributing it to a user when a valid session
/// cookie is present and recording it anonymously otherwise.
///
/// Strictly best-effort: a stats failure must never fail the request.
pub async fn track_route_stats(request: Request, next: Next) -> Response {
    let route = request.uri().path().to_string();
    let method = request.method().to_string();
    // Owned copies only past this point: the request body is not Sync, so
    // nothing here may borrow the request across an await.
    let token = token_from_headers(request.headers());
    let user_id = attribute_user(token).await;

    match RouteStatsStore::shared() {
        Ok(store) => {
            if let Err(e) = store.record(user_id, &route, &method).await {
                tracing::debug!("Failed to record route stats for {} {}: {}", method, route, e);
            }
        }
        Err(e) => tracing::debug!("Route stats store unavailable: {}", e),
    }

    next.run(request).await
}

/// Resolve the caller's user id from their session token, if they sent one
/// and it checks out. Any failure just means an anonymous record.
async fn attribute_user(token: Option<String>) -> Option<Uuid> {
    let token = token?;
    let secret = &config::config().security.jwt_secret;
    let claims = verify_token(&token, TokenPurpose::Session, secret).ok()?;

    let store = UserStore::shared().ok()?;
    let user = store.find_by_email(&claims.sub).await.ok()??;
    Some(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    // Also pins the Send bound: from_fn rejects a middleware future that
    // borrows the request across an await.
    #[tokio::test]
    async fn unavailable_stats_store_never_fails_the_request() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn(track_route_stats));

        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), axum::http::StatusCode::OK);
    }
}

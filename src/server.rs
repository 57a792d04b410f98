use axum::{
    http::{header, Method},
    middleware::from_fn,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{require_admin, require_session, track_api_calls, track_route_stats};

/// Build the full application router with the middleware chain:
/// stats (global) -> auth -> [admin gate] -> [quota] -> handler.
pub fn app() -> Router {
    // Public: registration, login, password recovery
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/users",
            post(handlers::auth::register).get(handlers::users::list_users),
        )
        .route("/users/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password/:token", post(handlers::auth::reset_password));

    // Session-holders only
    let session = Router::new()
        .route("/users/logout", post(handlers::auth::logout))
        .route("/verify-token", get(handlers::users::verify_token))
        .route("/api-call-count", get(handlers::users::api_call_count))
        .layer(from_fn(require_session));

    // Admin only; the gate runs after session auth
    let admin = Router::new()
        .route("/verify-admin", get(handlers::users::verify_admin))
        .route(
            "/reset-api-call-count/:email",
            patch(handlers::admin::reset_api_call_count),
        )
        .route("/promote-user/:email", patch(handlers::admin::promote_user))
        .route("/delete-user/:email", delete(handlers::admin::delete_user))
        .route("/api-route-stats", get(handlers::admin::api_route_stats))
        .layer(from_fn(require_admin))
        .layer(from_fn(require_session));

    // Metered AI proxy calls; quota runs after session auth
    let metered = Router::new()
        .route("/chat", post(handlers::ai::chat))
        .route("/generate-image", post(handlers::ai::generate_image))
        .layer(from_fn(track_api_calls))
        .layer(from_fn(require_session));

    Router::new()
        .merge(public)
        .merge(session)
        .merge(admin)
        .merge(metered)
        // Global middleware
        .layer(from_fn(track_route_stats))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// CORS that reflects the request origin and allows credentials, so the
/// cookie survives cross-origin frontends (the wildcard origin cannot be
/// combined with credentials).
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Quota Gate API",
            "version": version,
            "description": "Quota-gated AI proxy with user auth and admin tooling",
            "endpoints": {
                "users": "POST /users, GET /users, POST /users/login, POST /users/logout",
                "passwords": "POST /forgot-password, POST /reset-password/:token",
                "session": "GET /verify-token, GET /api-call-count",
                "admin": "GET /verify-admin, PATCH /promote-user/:email, PATCH /reset-api-call-count/:email, DELETE /delete-user/:email, GET /api-route-stats",
                "metered": "POST /chat, POST /generate-image",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

use axum::extract::Path;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, password, verify_token, TokenError, TokenPurpose};
use crate::config;
use crate::database::UserStore;
use crate::error::ApiError;
use crate::middleware::auth::TOKEN_COOKIE;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// POST /users - register a new user
///
/// New accounts start with a zeroed call counter and no admin rights.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    let (email, plain) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Err(ApiError::bad_request("Missing email or password")),
    };

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    let cost = config::config().security.bcrypt_cost;
    let password_hash = password::hash_password(plain, cost).await?;

    let store = UserStore::shared()?;
    match store.create(&email, &password_hash).await? {
        Some(user) => {
            tracing::info!("Registered user '{}'", user.email);
            Ok(ApiResponse::created(json!({
                "message": "User successfully registered!"
            })))
        }
        None => Err(ApiError::conflict("User already exists")),
    }
}

/// POST /users/login - verify credentials and set the session cookie
///
/// Unknown emails get 404 and bad passwords 401, mirroring the original
/// API's contract.
pub async fn login(
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let (email, plain) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::bad_request("Missing email or password")),
    };

    let store = UserStore::shared()?;
    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let valid = password::verify_password(plain, user.password_hash.clone()).await?;
    if !valid {
        return Err(ApiError::unauthorized(
            "You're not authorized to access this resource",
        ));
    }

    let security = &config::config().security;
    let token = issue_token(
        &user.email,
        TokenPurpose::Session,
        Duration::seconds(security.session_ttl_secs),
        &security.jwt_secret,
    )
    .map_err(|e| {
        tracing::error!("Failed to issue session token: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    tracing::info!("User '{}' logged in", user.email);
    Ok((
        jar.add(session_cookie(token)),
        ApiResponse::success(json!({ "message": "Logged in successfully" })),
    ))
}

/// POST /users/logout - clear the client-held cookie
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// token stays valid for its remaining TTL.
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<Value>) {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        ApiResponse::success(json!({ "message": "Logged out successfully" })),
    )
}

/// POST /forgot-password - issue a short-lived password reset token
///
/// Delivering the token out-of-band is out of scope; it comes back in the
/// response body, matching the original API.
pub async fn forgot_password(Json(payload): Json<ForgotPasswordRequest>) -> ApiResult<Value> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing email"))?;

    let store = UserStore::shared()?;
    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let security = &config::config().security;
    let token = issue_token(
        &user.email,
        TokenPurpose::PasswordReset,
        Duration::seconds(security.reset_ttl_secs),
        &security.jwt_secret,
    )
    .map_err(|e| {
        tracing::error!("Failed to issue reset token: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    tracing::info!("Issued password reset token for '{}'", user.email);
    Ok(ApiResponse::success(json!({
        "token": token,
        "message": "Token generated for password reset. Use it to reset your password."
    })))
}

/// POST /reset-password/:token - replace the stored password hash
///
/// Only reset-scoped tokens are accepted here; a session token is rejected
/// as invalid.
pub async fn reset_password(
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Value> {
    let new_password = payload
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing new password"))?;

    let security = &config::config().security;
    let claims = verify_token(&token, TokenPurpose::PasswordReset, &security.jwt_secret).map_err(
        |e| match e {
            TokenError::Expired => ApiError::session_expired("Password reset token has expired"),
            _ => ApiError::unauthorized("Invalid password reset token"),
        },
    )?;

    let store = UserStore::shared()?;
    let user = store
        .find_by_email(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password_hash = password::hash_password(new_password, security.bcrypt_cost).await?;
    store.update_password(&user.email, &password_hash).await?;

    tracing::info!("Password reset for '{}'", user.email);
    Ok(ApiResponse::success(json!({
        "message": "Password has been reset"
    })))
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(TOKEN_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    if config::config().security.secure_cookies {
        // Cross-origin frontends need SameSite=None, which requires Secure
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::None);
    } else {
        cookie.set_same_site(SameSite::Lax);
    }
    cookie
}

/// Cheap structural check; the store's unique constraint is the real
/// gatekeeper for duplicates.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice @example.com"));
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("tok".to_string());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}

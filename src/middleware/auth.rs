use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_token, TokenError, TokenPurpose};
use crate::config;
use crate::database::models::User;
use crate::database::UserStore;
use crate::error::ApiError;

/// Name of the HTTP-only cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// The authenticated user for this request, resolved fresh from the store.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Session authentication middleware.
///
/// Verifies the `token` cookie as a session-scoped token, re-resolves the
/// subject against the user store (a deleted user's still-valid token dies
/// here), and attaches the resolved record to the request. An expired token
/// is reported distinctly from a missing or invalid one so clients can tell
/// "log in again" apart from "not logged in".
pub async fn require_session(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = token_from_headers(request.headers())
        .ok_or_else(|| ApiError::unauthorized("You're not authorized to access this resource"))?;

    let secret = &config::config().security.jwt_secret;
    let claims = verify_token(&token, TokenPurpose::Session, secret).map_err(|e| match e {
        TokenError::Expired => {
            ApiError::session_expired("Your session has expired, please log in again")
        }
        _ => ApiError::unauthorized("You're not authorized to access this resource"),
    })?;

    let store = UserStore::shared()?;
    let user = store.find_by_email(&claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Valid token for unknown user '{}'", claims.sub);
        ApiError::unauthorized("You're not authorized to access this resource")
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Pull the session token out of the `Cookie` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == TOKEN_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_cookie() {
        let headers = headers_with_cookie("token=abc.def.ghi");
        assert_eq!(token_from_headers(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc; lang=en");
        assert_eq!(token_from_headers(&headers), Some("abc".to_string()));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(token_from_headers(&headers), None);
        let headers = headers_with_cookie("token=");
        assert_eq!(token_from_headers(&headers), None);
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub mod password;

/// What a token is allowed to be used for. A password reset token must never
/// be accepted as a session credential, and vice versa, so the purpose is a
/// signed claim rather than an expiry convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, PartialEq)]
pub enum TokenError {
    /// Signature checked out but the expiry has passed. Callers surface this
    /// as a distinct "session expired" condition.
    Expired,
    /// Bad signature, malformed token, or wrong purpose.
    Invalid,
    Generation(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token expired"),
            TokenError::Invalid => write!(f, "token invalid"),
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issue a signed token for `email`, scoped to `purpose`, expiring `ttl`
/// from now. Pure function of the secret and inputs; nothing is persisted.
pub fn issue_token(
    email: &str,
    purpose: TokenPurpose,
    ttl: Duration,
    secret: &str,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        purpose,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature, expiry and purpose. Expiry is checked with zero leeway
/// so a TTL of zero is already expired.
pub fn verify_token(
    token: &str,
    purpose: TokenPurpose,
    secret: &str,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    // The library accepts exp == now; here a token is dead the moment its
    // expiry arrives, so the boundary second counts as expired too.
    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    if data.claims.purpose != purpose {
        return Err(TokenError::Invalid);
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let token =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::hours(1), SECRET)
                .unwrap();
        let claims = verify_token(&token, TokenPurpose::Session, SECRET).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.purpose, TokenPurpose::Session);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_expired_not_invalid() {
        let token =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::seconds(-10), SECRET)
                .unwrap();
        assert_eq!(
            verify_token(&token, TokenPurpose::Session, SECRET),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn zero_ttl_token_is_already_expired() {
        let token =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::zero(), SECRET)
                .unwrap();
        assert_eq!(
            verify_token(&token, TokenPurpose::Session, SECRET),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn short_ttl_token_is_still_valid_before_expiry() {
        // Guards the expiry check against rejecting tokens early
        let token =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::seconds(30), SECRET)
                .unwrap();
        assert!(verify_token(&token, TokenPurpose::Session, SECRET).is_ok());
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(
            verify_token("not-a-jwt", TokenPurpose::Session, SECRET),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::hours(1), SECRET)
                .unwrap();
        assert_eq!(
            verify_token(&token, TokenPurpose::Session, "other-secret"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn reset_token_is_not_a_session_token() {
        let token = issue_token(
            "alice@example.com",
            TokenPurpose::PasswordReset,
            Duration::minutes(15),
            SECRET,
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, TokenPurpose::Session, SECRET),
            Err(TokenError::Invalid)
        );
        // and the other direction
        let session =
            issue_token("alice@example.com", TokenPurpose::Session, Duration::hours(1), SECRET)
                .unwrap();
        assert_eq!(
            verify_token(&session, TokenPurpose::PasswordReset, SECRET),
            Err(TokenError::Invalid)
        );
    }
}

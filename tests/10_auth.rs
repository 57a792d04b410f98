mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Duration;
use tower::ServiceExt;

use quota_gate::auth::{issue_token, TokenPurpose};

#[tokio::test]
async fn root_endpoint_responds() -> Result<()> {
    let res = common::app()
        .oneshot(common::bare_request("GET", "/"))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = common::body_json(res).await;
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let res = common::app()
        .oneshot(common::bare_request("GET", "/api-call-count"))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let res = common::app()
        .oneshot(common::request_with_cookie("GET", "/verify-token", "not-a-jwt"))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_session_expired_not_unauthorized() -> Result<()> {
    let token = issue_token(
        "alice@example.com",
        TokenPurpose::Session,
        Duration::seconds(-5),
        common::TEST_SECRET,
    )?;

    let res = common::app()
        .oneshot(common::request_with_cookie("GET", "/verify-token", &token))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "SESSION_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn zero_ttl_token_is_session_expired() -> Result<()> {
    let token = issue_token(
        "alice@example.com",
        TokenPurpose::Session,
        Duration::zero(),
        common::TEST_SECRET,
    )?;

    let res = common::app()
        .oneshot(common::request_with_cookie("POST", "/chat", &token))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "SESSION_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() -> Result<()> {
    let token = issue_token(
        "alice@example.com",
        TokenPurpose::Session,
        Duration::hours(1),
        "some-other-secret",
    )?;

    let res = common::app()
        .oneshot(common::request_with_cookie("GET", "/verify-token", &token))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn reset_token_is_rejected_as_session_credential() -> Result<()> {
    // A password reset token must not open an authenticated session
    let token = issue_token(
        "alice@example.com",
        TokenPurpose::PasswordReset,
        Duration::minutes(15),
        common::TEST_SECRET,
    )?;

    let res = common::app()
        .oneshot(common::request_with_cookie("GET", "/api-call-count", &token))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_a_token_first() -> Result<()> {
    for (method, uri) in [
        ("GET", "/verify-admin"),
        ("PATCH", "/promote-user/bob@example.com"),
        ("PATCH", "/reset-api-call-count/bob@example.com"),
        ("DELETE", "/delete-user/bob@example.com"),
        ("GET", "/api-route-stats"),
    ] {
        let res = common::app()
            .oneshot(common::bare_request(method, uri))
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
    Ok(())
}

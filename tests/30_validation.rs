mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn register_without_password_is_bad_request() -> Result<()> {
    let res = common::app()
        .oneshot(common::json_request(
            "POST",
            "/users",
            json!({ "email": "alice@example.com" }),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(res).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], "Missing email or password");
    Ok(())
}

#[tokio::test]
async fn register_without_email_is_bad_request() -> Result<()> {
    let res = common::app()
        .oneshot(common::json_request(
            "POST",
            "/users",
            json!({ "password": "hunter2" }),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn register_with_malformed_email_is_bad_request() -> Result<()> {
    let res = common::app()
        .oneshot(common::json_request(
            "POST",
            "/users",
            json!({ "email": "not-an-email", "password": "hunter2" }),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(res).await;
    assert_eq!(body["message"], "Invalid email address");
    Ok(())
}

#[tokio::test]
async fn login_without_credentials_is_bad_request() -> Result<()> {
    let res = common::app()
        .oneshot(common::json_request("POST", "/users/login", json!({})))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn forgot_password_without_email_is_bad_request() -> Result<()> {
    let res = common::app()
        .oneshot(common::json_request("POST", "/forgot-password", json!({})))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

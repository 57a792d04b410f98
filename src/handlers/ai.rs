use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, QuotaStanding};
use crate::services::{AiClient, ChatMessage};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: Option<String>,
}

/// POST /chat - metered chat completion proxy
///
/// Runs behind the auth and quota middleware; `QuotaStanding` carries the
/// post-increment counter this request was admitted at.
pub async fn chat(
    Extension(standing): Extension<QuotaStanding>,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Value> {
    let messages = payload
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing messages"))?;

    let client = AiClient::from_config()?;
    let message = client.chat(&messages).await?;

    Ok(ApiResponse::success(json!({
        "message": message,
        "apiCallCounter": standing.count
    })))
}

/// POST /generate-image - metered image generation proxy
pub async fn generate_image(
    Extension(standing): Extension<QuotaStanding>,
    Json(payload): Json<ImageRequest>,
) -> ApiResult<Value> {
    let prompt = payload
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing prompt"))?;

    let client = AiClient::from_config()?;
    let image_url = client.generate_image(&prompt).await?;

    Ok(ApiResponse::success(json!({
        "imageUrl": image_url,
        "apiCallCounter": standing.count
    })))
}

// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Response;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Turn any non-2xx answer into an error carrying the response text.
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    log::error!("Request to {} failed: {} {}", url, status, body);
    Err(AppError::Status {
        url,
        status: status.as_u16(),
        body,
    })
}

/// Check the status and read the body as JSON.
pub async fn read_json(response: Response) -> Result<Value> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Check the status and read the raw body.
pub async fn read_bytes(response: Response) -> Result<Vec<u8>> {
    let response = ensure_success(response).await?;
    Ok(response.bytes().await?.to_vec())
}

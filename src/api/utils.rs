use anyhow::{Context, Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ReportError;

pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint)
}

async fn send(request: RequestBuilder, url: &str) -> Result<Value> {
    let res = request
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    if !res.status().is_success() {
        return Err(ReportError::RequestFailed {
            url: url.to_string(),
            status: res.status().as_u16(),
        }
        .into());
    }

    let text = res.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let data = serde_json::from_str::<Value>(&text)
        .with_context(|| format!("Unexpected response from {}: {}", url, text))?;

    Ok(data)
}

pub async fn make_request(
    client: &Client,
    base_url: &str,
    endpoint: &str,
    token: &str,
) -> Result<Value> {
    let url = endpoint_url(base_url, endpoint);
    send(client.get(&url).bearer_auth(token), &url).await
}

pub async fn post_request(
    client: &Client,
    base_url: &str,
    endpoint: &str,
    token: Option<&str>,
    body: &Value,
) -> Result<Value> {
    let url = endpoint_url(base_url, endpoint);
    let mut request = client.post(&url).json(body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    send(request, &url).await
}

/// Unlike a quote lookup, an empty list is a valid answer here (no open
/// positions, nothing to settle), but every item must decode.
pub fn parse_response_array<T>(data: Value, error_msg: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    match data {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).with_context(|| error_msg.to_string()))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(Error::msg("Unexpected API response format: not an array")),
    }
}

pub fn parse_response_object<T>(data: Value, error_msg: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    match data {
        Value::Object(obj) => serde_json::from_value(Value::Object(obj))
            .with_context(|| error_msg.to_string()),
        _ => Err(Error::msg("Unexpected API response format: not an object")),
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::error::ReportError;

/// Source of HTML pages. Any non-success response is an error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let res = self
            .client
            .get(url)
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

        res.text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

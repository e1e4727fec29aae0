use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Fetch a response body from a remote endpoint. Fails on network or HTTP
/// errors; timeouts are the implementation's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String>;
}

/// HTTP transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("tweetpanel/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        let response = self.client.get(url).query(params).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("feed request failed: {}", response.status()));
        }

        Ok(response.text().await?)
    }
}

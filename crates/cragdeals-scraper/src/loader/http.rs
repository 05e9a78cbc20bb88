use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ContentLoader;
use crate::document::Document;
use crate::error::FetchError;

/// Plain `GET` with redirect following. One attempt, no retries.
#[derive(Debug)]
pub struct HttpLoader {
    client: Client,
    timeout: Duration,
}

impl HttpLoader {
    /// Creates an `HttpLoader` with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ContentLoader for HttpLoader {
    async fn load(&self, url: &Url) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9,hu;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Relative links resolve against wherever redirects ended up.
        let final_url = response.url().clone();
        let body = response.text().await?;
        tracing::debug!(url = %url, bytes = body.len(), "page fetched");
        Document::parse(final_url, &body)
    }

    fn budget(&self) -> Duration {
        self.timeout
    }
}

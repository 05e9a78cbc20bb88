use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ContentLoader;
use crate::document::Document;
use crate::error::FetchError;

/// Fetches the post-render DOM from a Browserless-compatible `/content`
/// endpoint.
///
/// The service opens the page in a headless browser, waits `settle_ms` for
/// client-side listings to appear, and returns the resulting HTML.
pub struct RenderedLoader {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    settle_ms: u64,
    budget: Duration,
}

impl RenderedLoader {
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRenderUrl`] if `base_url` is not a valid
    /// URL, or [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        settle_ms: u64,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidRenderUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        let endpoint = base.join("content").map_err(|e| invalid(e.to_string()))?;

        // The service itself spends up to settle_ms waiting before it answers.
        let budget = Duration::from_secs(timeout_secs) + Duration::from_millis(settle_ms);
        let client = Client::builder()
            .timeout(budget)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.map(String::from),
            settle_ms,
            budget,
        })
    }
}

impl std::fmt::Debug for RenderedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedLoader")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("settle_ms", &self.settle_ms)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentLoader for RenderedLoader {
    async fn load(&self, url: &Url) -> Result<Document, FetchError> {
        let mut request = self.client.post(self.endpoint.clone()).json(&serde_json::json!({
            "url": url.as_str(),
            "waitForTimeout": self.settle_ms,
        }));
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Render {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = response.text().await?;
        tracing::debug!(url = %url, bytes = body.len(), "page rendered");
        Document::parse(url.clone(), &body)
    }

    fn budget(&self) -> Duration {
        self.budget
    }
}

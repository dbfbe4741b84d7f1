use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Brings a product page to the fully loaded state the extractor expects.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Final HTML of the page at `url`.
    async fn load(&self, url: &str) -> Result<String>;
}

/// Plain HTTP fetch. Prices rendered by client-side scripts are only
/// visible to it through structured data and meta tags.
#[derive(Clone, Debug)]
pub struct HttpPageLoader {
    client: Client,
}

impl HttpPageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(anyhow!("URL must use HTTP or HTTPS protocol"));
        }

        let response = self
            .client
            .get(parsed)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} answered with HTTP {}", url, status.as_u16()));
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body of {}", url))?;
        debug!("loaded {} ({} bytes)", url, html.len());
        Ok(html)
    }
}

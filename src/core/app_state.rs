use std::sync::Arc;
use std::time::Duration;

use super::config::{load_config, PricewatchConfig};

/// Shared state for the CLI commands: one HTTP client and the resolved config.
#[derive(Clone, Debug)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub config: Arc<PricewatchConfig>,
}

impl AppState {
    pub fn new(http_client: reqwest::Client, config: PricewatchConfig) -> Self {
        Self {
            http_client,
            config: Arc::new(config),
        }
    }

    /// Load `pricewatch.json` and build an HTTP client from it.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = load_config();
        let http_client = reqwest::Client::builder()
            .timeout(config.checker.resolve_page_timeout())
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.checker.resolve_user_agent())
            .build()?;
        Ok(Self::new(http_client, config))
    }
}

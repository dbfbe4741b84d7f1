use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// PricewatchConfig: file-based config loader (pricewatch.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "PRICEWATCH_CONFIG";
pub const ENV_STORE_PATH: &str = "PRICEWATCH_STORE";
pub const ENV_CHECK_INTERVAL_MINUTES: &str = "PRICEWATCH_CHECK_INTERVAL_MINUTES";
pub const ENV_PAGE_TIMEOUT_SECS: &str = "PRICEWATCH_PAGE_TIMEOUT_SECS";
pub const ENV_SETTLE_DELAY_MS: &str = "PRICEWATCH_SETTLE_DELAY_MS";
pub const ENV_USER_AGENT: &str = "PRICEWATCH_USER_AGENT";
pub const ENV_DESKTOP_NOTIFY: &str = "PRICEWATCH_DESKTOP_NOTIFY";

const DEFAULT_INTERVAL_MINUTES: u64 = 1440;
const MAX_INTERVAL_MINUTES: u64 = 366 * 1440;
const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 45;
const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Background checker sub-config (mirrors the `checker` key in pricewatch.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct CheckerConfig {
    /// Minutes between two check cycles. Default: 1440 (daily).
    pub interval_minutes: Option<u64>,
    /// Upper bound for load + settle + extract of a single page. Default: 45.
    pub page_timeout_secs: Option<u64>,
    /// Pause between page load and extraction, for late-rendered prices. Default: 2000.
    pub settle_delay_ms: Option<u64>,
    pub user_agent: Option<String>,
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl CheckerConfig {
    /// Interval: JSON field → `PRICEWATCH_CHECK_INTERVAL_MINUTES` → 1440 minutes.
    /// Clamped to between one minute and one year.
    pub fn resolve_interval(&self) -> Duration {
        let minutes = self
            .interval_minutes
            .or_else(|| env_u64(ENV_CHECK_INTERVAL_MINUTES))
            .unwrap_or(DEFAULT_INTERVAL_MINUTES)
            .clamp(1, MAX_INTERVAL_MINUTES);
        Duration::from_secs(minutes.saturating_mul(60))
    }

    /// Page timeout: JSON field → `PRICEWATCH_PAGE_TIMEOUT_SECS` → 45 s.
    pub fn resolve_page_timeout(&self) -> Duration {
        let secs = self
            .page_timeout_secs
            .or_else(|| env_u64(ENV_PAGE_TIMEOUT_SECS))
            .unwrap_or(DEFAULT_PAGE_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Settle delay: JSON field → `PRICEWATCH_SETTLE_DELAY_MS` → 2000 ms.
    pub fn resolve_settle_delay(&self) -> Duration {
        let ms = self
            .settle_delay_ms
            .or_else(|| env_u64(ENV_SETTLE_DELAY_MS))
            .unwrap_or(DEFAULT_SETTLE_DELAY_MS);
        Duration::from_millis(ms)
    }

    /// User agent: JSON field → `PRICEWATCH_USER_AGENT` → desktop Chrome UA.
    pub fn resolve_user_agent(&self) -> String {
        if let Some(ua) = &self.user_agent {
            if !ua.trim().is_empty() {
                return ua.trim().to_string();
            }
        }
        std::env::var(ENV_USER_AGENT)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}

/// Top-level config loaded from `pricewatch.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct PricewatchConfig {
    /// Path of the tracked-items JSON store.
    pub store_path: Option<String>,
    pub checker: CheckerConfig,
}

impl PricewatchConfig {
    /// Store path: JSON field → `PRICEWATCH_STORE` → `~/.pricewatch/tracked-items.json`.
    ///
    /// Without a home directory the store lands in the working directory.
    pub fn resolve_store_path(&self) -> PathBuf {
        if let Some(p) = &self.store_path {
            if !p.trim().is_empty() {
                return PathBuf::from(p.trim());
            }
        }
        if let Ok(p) = std::env::var(ENV_STORE_PATH) {
            if !p.trim().is_empty() {
                return PathBuf::from(p.trim());
            }
        }
        match dirs::home_dir() {
            Some(home) => home.join(".pricewatch").join("tracked-items.json"),
            None => PathBuf::from("tracked-items.json"),
        }
    }
}

/// Load `pricewatch.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PRICEWATCH_CONFIG` env var path
/// 2. `./pricewatch.json`
/// 3. `../pricewatch.json`
///
/// Missing file → `PricewatchConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `PricewatchConfig::default()`.
pub fn load_config() -> PricewatchConfig {
    let mut candidates = vec![
        PathBuf::from("pricewatch.json"),
        PathBuf::from("../pricewatch.json"),
    ];
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match parse_config(&contents) {
            Ok(cfg) => {
                tracing::info!("pricewatch.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "pricewatch.json parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                PricewatchConfig::default()
            }
        };
    }

    PricewatchConfig::default()
}

pub fn parse_config(contents: &str) -> serde_json::Result<PricewatchConfig> {
    serde_json::from_str(contents)
}

/// Desktop notifications are opt-in: `PRICEWATCH_DESKTOP_NOTIFY=1` (or `true`/`yes`/`on`).
pub fn desktop_notifications_enabled() -> bool {
    let Ok(v) = std::env::var(ENV_DESKTOP_NOTIFY) else {
        return false;
    };
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

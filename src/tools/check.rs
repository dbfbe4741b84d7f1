use crate::core::config::CheckerConfig;
use crate::features::alerts::{should_notify, PriceDropAlert};
use crate::features::notifier::Notifier;
use crate::features::store::TrackerStore;
use crate::scraping::{extract_from_html, PageLoader};
use crate::types::{PriceHistoryPoint, ProductSnapshot};
use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;

const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(45);
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// Outcome of one pass over all tracked items.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
    pub alerts: usize,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} checked, {} updated, {} failed, {} alert(s)",
            self.checked, self.updated, self.failed, self.alerts
        )
    }
}

/// Re-checks tracked pages one after another and records new prices.
pub struct PriceChecker<L, N> {
    loader: L,
    notifier: N,
    page_timeout: Duration,
    settle_delay: Duration,
}

impl<L: PageLoader, N: Notifier> PriceChecker<L, N> {
    pub fn new(loader: L, notifier: N) -> Self {
        Self {
            loader,
            notifier,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn from_config(loader: L, notifier: N, config: &CheckerConfig) -> Self {
        Self::new(loader, notifier)
            .with_page_timeout(config.resolve_page_timeout())
            .with_settle_delay(config.resolve_settle_delay())
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Load `url`, let late content settle, then extract.
    ///
    /// Load errors and timeouts are logged and reported as `None`, the same
    /// as a page with no detectable price.
    pub async fn snapshot(&self, url: &str) -> Option<ProductSnapshot> {
        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                warn!("skipping invalid URL '{}': {}", url, e);
                return None;
            }
        };

        let load = async {
            let html = self.loader.load(url).await?;
            tokio::time::sleep(self.settle_delay).await;
            anyhow::Ok(html)
        };

        let html = match tokio::time::timeout(self.page_timeout, load).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                warn!("failed to load {}: {:#}", url, e);
                return None;
            }
            Err(_) => {
                warn!("timed out after {:?} waiting for {}", self.page_timeout, url);
                return None;
            }
        };

        let snapshot = extract_from_html(&html, page_url);
        if snapshot.is_none() {
            warn!("no product price detected on {}", url);
        }
        snapshot
    }

    /// One check cycle over every tracked item, in store order.
    ///
    /// Alerts are evaluated against the history before the new point is
    /// appended. The store is saved only when at least one item got a price.
    pub async fn check_all(&self, store: &mut TrackerStore) -> Result<CheckReport> {
        let mut report = CheckReport::default();

        for item in store.items_mut() {
            report.checked += 1;
            let Some(snapshot) = self.snapshot(&item.url).await else {
                report.failed += 1;
                continue;
            };

            let now = Utc::now();
            item.last_updated = Some(now);
            if !snapshot.currency.is_empty() {
                item.currency = snapshot.currency.clone();
            }

            if should_notify(item, snapshot.price) {
                report.alerts += 1;
                let alert = PriceDropAlert::new(item, snapshot.price);
                if let Err(e) = self.notifier.notify(&alert) {
                    warn!("could not deliver alert for {}: {:#}", item.url, e);
                }
            }

            item.prices.push(PriceHistoryPoint {
                price: snapshot.price,
                date: now,
            });
            report.updated += 1;
        }

        if report.updated > 0 {
            store.set_last_sync(Utc::now());
            store.save()?;
        }

        info!("price check finished: {}", report);
        Ok(report)
    }

    /// Open the store at `path`, run one cycle over it and save.
    pub async fn check_store_at(&self, path: &Path) -> Result<CheckReport> {
        let mut store = TrackerStore::open(path)?;
        self.check_all(&mut store).await
    }

    /// Run a check cycle every `every` (the first one immediately) until
    /// `shutdown` resolves, which also cuts a running cycle short. The store is re-read each cycle so items tracked
    /// in the meantime are picked up.
    pub async fn run_periodic<F>(&self, store_path: &Path, every: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "checking prices every {} minute(s) using {}",
            every.as_secs() / 60,
            store_path.display()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping price checks");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("shutdown requested, abandoning the running price check");
                            return Ok(());
                        }
                        result = self.check_store_at(store_path) => {
                            if let Err(e) = result {
                                warn!("price check cycle failed: {:#}", e);
                            }
                        }
                    }
                }
            }
        }
    }
}

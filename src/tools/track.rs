use super::check::PriceChecker;
use crate::features::notifier::Notifier;
use crate::features::store::TrackerStore;
use crate::scraping::PageLoader;
use crate::types::TrackedItem;
use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;

/// Start tracking the product at `url`, or add a price point if it is
/// already tracked, and persist the store.
pub async fn track_url<L, N>(
    checker: &PriceChecker<L, N>,
    store: &mut TrackerStore,
    url: &str,
) -> Result<TrackedItem>
where
    L: PageLoader,
    N: Notifier,
{
    let snapshot = checker
        .snapshot(url)
        .await
        .ok_or_else(|| anyhow!("Could not detect a product price on {}", url))?;

    let entry = TrackedItem::from_snapshot(&snapshot, Utc::now());
    let tracked = store.add_or_update(entry).clone();
    store.save()?;

    info!(
        "tracking {} at {} {} ({} point(s))",
        tracked.title,
        snapshot.price,
        snapshot.currency,
        tracked.prices.len()
    );
    Ok(tracked)
}

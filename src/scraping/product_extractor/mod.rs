mod dom;
mod jsonld;
mod metadata;
pub mod scoring;

pub use dom::{collect_candidates, Candidate, MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE};

use super::page::Page;
use crate::types::{PriceReading, ProductSnapshot};
use tracing::debug;
use url::Url;

type Strategy = fn(&Page) -> Option<PriceReading>;

/// Extraction strategies in priority order. The first one that finds a valid
/// price wins; later ones are not consulted.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("structured_data", jsonld::extract),
    ("meta_tags", metadata::extract),
    ("dom_heuristic", dom::extract),
];

/// Read the current product price, currency and title off a loaded page.
///
/// Returns `None` when no strategy detects a product price. Never returns a
/// non-finite or non-positive price.
pub fn extract_product_data(page: &Page) -> Option<ProductSnapshot> {
    let (strategy, reading) = STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(page)
            .filter(PriceReading::is_valid)
            .map(|reading| (*name, reading))
    })?;

    debug!(
        "price {} {} found by {} on {}",
        reading.price,
        reading.currency,
        strategy,
        page.url()
    );

    Some(ProductSnapshot {
        title: metadata::extract_title(page.document()),
        price: reading.price,
        currency: reading.currency,
        url: page.url().to_string(),
    })
}

/// Parse `html` as the page at `url` (inline-style visibility) and extract.
pub fn extract_from_html(html: &str, url: Url) -> Option<ProductSnapshot> {
    extract_product_data(&Page::parse(html, url))
}

/// Name of the strategy that would produce the page's price, if any.
pub fn winning_strategy(page: &Page) -> Option<&'static str> {
    STRATEGIES
        .iter()
        .find(|(_, strategy)| strategy(page).is_some_and(|r| r.is_valid()))
        .map(|(name, _)| *name)
}

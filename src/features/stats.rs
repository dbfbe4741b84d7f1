use crate::types::{PriceHistoryPoint, TrackedItem};
use std::cmp::Ordering;
use url::Url;

/// Summary of one item's price history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

impl PriceStats {
    pub fn from_history(prices: &[PriceHistoryPoint]) -> Option<Self> {
        let current = prices.last()?.price;
        let (min, max, sum) = prices.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), p| (min.min(p.price), max.max(p.price), sum + p.price),
        );
        Some(Self {
            current,
            min,
            max,
            average: sum / prices.len() as f64,
        })
    }
}

/// How the current price compares with the item's average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealScore {
    Great,
    Good,
    Fair,
    High,
}

impl DealScore {
    /// Needs at least two recorded prices.
    pub fn from_history(prices: &[PriceHistoryPoint]) -> Option<Self> {
        if prices.len() < 2 {
            return None;
        }
        let stats = PriceStats::from_history(prices)?;
        let delta = (stats.average - stats.current) / stats.average * 100.0;
        Some(if delta > 15.0 {
            DealScore::Great
        } else if delta > 5.0 {
            DealScore::Good
        } else if delta > -5.0 {
            DealScore::Fair
        } else {
            DealScore::High
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealScore::Great => "Great",
            DealScore::Good => "Good",
            DealScore::Fair => "Fair",
            DealScore::High => "High",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            DealScore::Great => "Significantly cheaper than average.",
            DealScore::Good => "Below average price.",
            DealScore::Fair => "Around average price.",
            DealScore::High => "Price is above average.",
        }
    }
}

/// Movement between the last two recorded prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceChange {
    New,
    Up(f64),
    Down(f64),
    Unchanged,
}

impl PriceChange {
    pub fn of(item: &TrackedItem) -> Self {
        match (item.previous_price(), item.latest_price()) {
            (Some(prev), Some(cur)) if cur > prev => PriceChange::Up(cur - prev),
            (Some(prev), Some(cur)) if cur < prev => PriceChange::Down(prev - cur),
            (Some(_), Some(_)) => PriceChange::Unchanged,
            _ => PriceChange::New,
        }
    }

    pub fn badge(&self) -> String {
        match self {
            PriceChange::New => "New".to_string(),
            PriceChange::Up(d) => format!("+{:.2}", d),
            PriceChange::Down(d) => format!("-{:.2}", d),
            PriceChange::Unchanged => "--".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Most recently updated first.
    #[default]
    Recent,
    /// Largest drop between the last two prices first.
    Drop,
    /// Highest recorded price first.
    High,
}

impl SortMode {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Some(SortMode::Recent),
            "drop" => Some(SortMode::Drop),
            "high" => Some(SortMode::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Drop => "drop",
            SortMode::High => "high",
        }
    }
}

fn last_drop(item: &TrackedItem) -> f64 {
    match (item.previous_price(), item.latest_price()) {
        (Some(prev), Some(cur)) => prev - cur,
        _ => 0.0,
    }
}

fn max_price(item: &TrackedItem) -> f64 {
    item.prices.iter().map(|p| p.price).fold(0.0, f64::max)
}

pub fn sort_items(items: &[TrackedItem], mode: SortMode) -> Vec<&TrackedItem> {
    let mut sorted: Vec<&TrackedItem> = items.iter().collect();
    match mode {
        SortMode::Recent => sorted.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
        SortMode::Drop => sorted.sort_by(|a, b| {
            last_drop(b)
                .partial_cmp(&last_drop(a))
                .unwrap_or(Ordering::Equal)
        }),
        SortMode::High => sorted.sort_by(|a, b| {
            max_price(b)
                .partial_cmp(&max_price(a))
                .unwrap_or(Ordering::Equal)
        }),
    }
    sorted
}

/// `1234.5` + `"USD"` → `"1,234.5 USD"`. At most two fraction digits.
pub fn price_label(price: f64, currency: &str) -> String {
    if !price.is_finite() {
        return "--".to_string();
    }
    let fixed = format!("{:.2}", price.abs());
    let fixed = fixed.trim_end_matches('0').trim_end_matches('.');
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    if price < 0.0 && grouped != "0" {
        grouped.insert(0, '-');
    }

    if currency.is_empty() {
        grouped
    } else {
        format!("{} {}", grouped, currency)
    }
}

/// Host of `url` without a leading `www.`; empty when the URL does not parse.
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

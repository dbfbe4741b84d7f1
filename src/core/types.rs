use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The product reading for one page at one point in time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub title: String,
    /// Always finite and strictly positive.
    pub price: f64,
    /// ISO-4217 code, or empty when the page gave no usable hint.
    pub currency: String,
    pub url: String,
}

/// Output of the price parser for a single piece of free text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAmount {
    pub value: f64,
    pub currency: String,
    /// A currency symbol or trailing code was present in the text.
    pub has_currency_signal: bool,
}

/// A price found by one extraction strategy, before title/url are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceReading {
    pub price: f64,
    pub currency: String,
}

impl PriceReading {
    pub fn new(price: f64, currency: impl Into<String>) -> Self {
        Self {
            price,
            currency: currency.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceHistoryPoint {
    pub price: f64,
    pub date: DateTime<Utc>,
}

/// Drop thresholds configured for one tracked item. Either or both may be set.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub target_percent: Option<f64>,
}

impl AlertConfig {
    pub fn is_empty(&self) -> bool {
        self.target_price.is_none() && self.target_percent.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prices: Vec<PriceHistoryPoint>,
    #[serde(default)]
    pub alert: Option<AlertConfig>,
}

impl TrackedItem {
    /// Start tracking a freshly extracted snapshot with a single history point.
    pub fn from_snapshot(snapshot: &ProductSnapshot, at: DateTime<Utc>) -> Self {
        let title = if snapshot.title.trim().is_empty() {
            "Untitled Product".to_string()
        } else {
            snapshot.title.clone()
        };
        Self {
            url: snapshot.url.clone(),
            title,
            currency: snapshot.currency.clone(),
            last_updated: Some(at),
            prices: vec![PriceHistoryPoint {
                price: snapshot.price,
                date: at,
            }],
            alert: None,
        }
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.prices.last().map(|p| p.price)
    }

    pub fn previous_price(&self) -> Option<f64> {
        self.prices.iter().rev().nth(1).map(|p| p.price)
    }
}

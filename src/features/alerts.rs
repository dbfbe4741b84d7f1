use crate::features::stats::price_label;
use crate::types::TrackedItem;

/// Whether `new_price` should raise a drop alert for `item`.
///
/// Must be called before `new_price` is appended to the item's history: the
/// percent drop is measured against the most recent prior recorded price.
pub fn should_notify(item: &TrackedItem, new_price: f64) -> bool {
    let Some(alert) = &item.alert else {
        return false;
    };

    if let Some(target) = alert.target_price.filter(|t| *t > 0.0) {
        if new_price <= target {
            return true;
        }
    }

    if let Some(percent) = alert.target_percent.filter(|p| *p > 0.0) {
        if let Some(last) = item.latest_price().filter(|p| *p > 0.0) {
            return drop_percent(last, new_price) >= percent;
        }
    }

    false
}

/// Percent drop from `previous` to `current`; negative for a rise.
pub fn drop_percent(previous: f64, current: f64) -> f64 {
    (previous - current) * 100.0 / previous
}

/// A triggered alert, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDropAlert {
    pub title: String,
    pub url: String,
    pub price: f64,
    pub currency: String,
}

impl PriceDropAlert {
    pub fn new(item: &TrackedItem, price: f64) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            price,
            currency: item.currency.clone(),
        }
    }

    pub fn headline(&self) -> &'static str {
        "Price Drop Alert!"
    }

    pub fn message(&self) -> String {
        format!(
            "{} has dropped to {}",
            self.title,
            price_label(self.price, &self.currency)
        )
    }
}

use super::Page;
use crate::scraping::price_parser;
use crate::types::PriceReading;
use scraper::Selector;
use serde_json::{Map, Value};

/// Structured-data strategy: price of the first `Product` in an embedded
/// JSON-LD block (`<script type="application/ld+json">`).
///
/// Blocks that fail to parse, or whose product has no usable offer price,
/// are skipped and scanning moves on to the next block.
pub(super) fn extract(page: &Page) -> Option<PriceReading> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;

    for script in page.document().select(&selector) {
        let json_text = script.text().collect::<String>();
        if json_text.trim().is_empty() {
            continue;
        }
        let Ok(json_value) = serde_json::from_str::<Value>(&json_text) else {
            continue;
        };
        let Some(product) = find_product(&json_value) else {
            continue;
        };
        if let Some(reading) = offer_price(product) {
            return Some(reading);
        }
    }

    None
}

/// First `Product` entity in a block: the block itself, an element of a
/// top-level list, or an element of an `@graph` list.
fn find_product(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product),
        Value::Object(map) => {
            if is_product(map) {
                return Some(map);
            }
            map.get("@graph").and_then(find_product)
        }
        _ => None,
    }
}

fn is_product(map: &Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(t)) => t == "Product",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Product")),
        _ => false,
    }
}

fn offer_price(product: &Map<String, Value>) -> Option<PriceReading> {
    let offer = first_object(product.get("offers")?)?;
    let spec = offer.get("priceSpecification").and_then(first_object);

    let price = offer
        .get("price")
        .and_then(json_number)
        .or_else(|| spec.and_then(|s| s.get("price")).and_then(json_number))
        .or_else(|| offer.get("lowPrice").and_then(json_number))?;

    let currency = offer
        .get("priceCurrency")
        .and_then(json_text)
        .or_else(|| spec.and_then(|s| s.get("priceCurrency")).and_then(json_text))
        .unwrap_or_default();

    let reading = PriceReading::new(price, currency);
    reading.is_valid().then_some(reading)
}

/// An object, or the first element of a list of objects.
fn first_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) => items.first().and_then(Value::as_object),
        _ => None,
    }
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>()
                .ok()
                .or_else(|| price_parser::parse(s).map(|p| p.value))
        }
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn json_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

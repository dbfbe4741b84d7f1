use super::scoring::{self, CandidateSignals};
use super::Page;
use crate::scraping::page::style_declarations;
use crate::scraping::price_parser::{self, collapse_whitespace};
use crate::types::PriceReading;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Elements that commonly hold a price, generic markers first, then
/// selectors for a few large retailers and storefront themes.
const PRICE_SELECTORS: &[&str] = &[
    "[itemprop='price']",
    "[data-testid*='price']",
    "[data-test*='price']",
    "[data-price]",
    ".price",
    ".product-price",
    ".current-price",
    ".pdp-price",
    ".price__current",
    "[class*='price']",
    "[id*='price']",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    ".a-price .a-offscreen",
];

/// Below this a reading is more likely a rating or a quantity.
pub const MIN_PLAUSIBLE_PRICE: f64 = 0.1;
/// Above this a reading is more likely a SKU or product id.
pub const MAX_PLAUSIBLE_PRICE: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub value: f64,
    pub currency: String,
    pub score: i32,
}

/// DOM heuristic strategy: score every visible price-looking element and
/// keep the best one. Ties go to the element that comes first in the page.
pub(super) fn extract(page: &Page) -> Option<PriceReading> {
    let best = collect_candidates(page).into_iter().next()?;
    Some(PriceReading::new(best.value, best.currency))
}

/// All surviving candidates, best first.
///
/// An element that wraps another matched element is left out: its text mixes
/// several readings and the inner element carries the precise one.
pub fn collect_candidates(page: &Page) -> Vec<Candidate> {
    let Ok(selector) = Selector::parse(&PRICE_SELECTORS.join(", ")) else {
        return Vec::new();
    };

    let matched: Vec<ElementRef<'_>> = page
        .document()
        .select(&selector)
        .filter(|el| page.is_visible(*el))
        .collect();
    let matched_ids: HashSet<_> = matched.iter().map(|el| el.id()).collect();
    let wraps_other_match =
        |el: &ElementRef<'_>| el.descendants().skip(1).any(|node| matched_ids.contains(&node.id()));

    let mut candidates: Vec<Candidate> = matched
        .iter()
        .copied()
        .filter(|el| !wraps_other_match(el))
        .filter_map(score_element)
        .collect();

    // Stable: equal scores keep document order.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn score_element(el: ElementRef<'_>) -> Option<Candidate> {
    let raw = source_text(el);
    let parsed = price_parser::parse(&raw)?;
    if !is_plausible_price(parsed.value) {
        return None;
    }

    let signals = CandidateSignals {
        currency_signal: parsed.has_currency_signal,
        ..element_signals(el, &raw)
    };

    Some(Candidate {
        value: parsed.value,
        currency: parsed.currency,
        score: scoring::score(&signals),
    })
}

pub fn is_plausible_price(value: f64) -> bool {
    (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&value)
}

/// Machine-readable attribute first, rendered text otherwise. Struck-through
/// descendants are left out of the rendered text.
fn source_text(el: ElementRef<'_>) -> String {
    let value = el.value();
    value
        .attr("content")
        .or_else(|| value.attr("data-price"))
        .filter(|v| !v.trim().is_empty())
        .map(collapse_whitespace)
        .unwrap_or_else(|| {
            let mut text = String::new();
            push_live_text(el, &mut text);
            collapse_whitespace(&text)
        })
}

fn push_live_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !is_strike_element(child_el) {
                push_live_text(child_el, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn element_signals(el: ElementRef<'_>, text: &str) -> CandidateSignals {
    let value = el.value();
    let class = value.attr("class").unwrap_or("");
    let id = value.attr("id").unwrap_or("");
    let test_id = value.attr("data-testid").unwrap_or("");
    let markers = format!("{class} {id} {test_id}").to_lowercase();

    CandidateSignals {
        microdata: value.attr("itemprop").is_some(),
        price_attribute: value.attr("data-price").is_some(),
        price_marker: markers.contains("price"),
        currency_signal: false,
        text_len: text.chars().count(),
        sale_language: scoring::has_sale_language(text),
        reference_language: scoring::has_reference_language(text),
        heading_context: in_heading(el),
        reference_marker: has_reference_marker(el),
        struck_through: is_struck_through(el),
    }
}

fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|c| c.split_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
}

fn ancestor_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

fn in_heading(el: ElementRef<'_>) -> bool {
    ancestor_elements(el).any(|a| {
        matches!(a.value().name(), "h1" | "h2") || has_class(&a, "h1") || has_class(&a, "h2")
    })
}

/// Reference-price class or id token on the element or any ancestor, as in
/// `<span class="old-price"><span class="price">`.
fn has_reference_marker(el: ElementRef<'_>) -> bool {
    std::iter::once(el).chain(ancestor_elements(el)).any(|a| {
        let value = a.value();
        let class = value.attr("class").unwrap_or("");
        let id = value.attr("id").unwrap_or("");
        scoring::has_reference_marker(&format!("{class} {id}"))
    })
}

fn is_struck_through(el: ElementRef<'_>) -> bool {
    std::iter::once(el)
        .chain(ancestor_elements(el))
        .any(is_strike_element)
}

fn is_strike_element(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "s" | "del" | "strike")
        || has_class(&el, "strike")
        || el.value().attr("style").is_some_and(|style| {
            style_declarations(style).any(|(property, value)| {
                property.starts_with("text-decoration") && value.contains("line-through")
            })
        })
}

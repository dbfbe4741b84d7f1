use super::Page;
use crate::scraping::price_parser::{self, collapse_whitespace};
use crate::types::PriceReading;
use scraper::{Html, Selector};

/// Meta tags known to carry a price, most trusted first.
const PRICE_META_SELECTORS: &[&str] = &[
    "meta[itemprop='price']",
    "meta[property='product:price:amount']",
    "meta[property='og:price:amount']",
    "meta[name='twitter:data1']",
    "meta[name='price']",
];

const CURRENCY_META_SELECTOR: &str = "meta[itemprop='priceCurrency'], meta[property='product:price:currency'], meta[property='og:price:currency']";

/// Meta-tag strategy: first price meta tag whose content parses to a
/// positive amount, paired with a companion currency tag when one exists.
pub(super) fn extract(page: &Page) -> Option<PriceReading> {
    let document = page.document();

    for sel in PRICE_META_SELECTORS {
        let Some(content) = first_content(document, sel) else {
            continue;
        };
        let Some(parsed) = price_parser::parse(&content) else {
            continue;
        };
        let currency = first_content(document, CURRENCY_META_SELECTOR)
            .map(|c| c.trim().to_string())
            .unwrap_or(parsed.currency);
        let reading = PriceReading::new(parsed.value, currency);
        if reading.is_valid() {
            return Some(reading);
        }
    }

    None
}

/// `content` of the first element matching `selector`, when it is non-empty.
fn first_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
}

/// Product title: `og:title`, then the first non-empty `<h1>`, then `<title>`.
pub(super) fn extract_title(document: &Html) -> String {
    if let Some(og_title) = first_content(document, "meta[property='og:title']") {
        return og_title.trim().to_string();
    }

    // Fallback to h1
    if let Ok(h1_selector) = Selector::parse("h1") {
        let heading = document
            .select(&h1_selector)
            .map(|h1| collapse_whitespace(&h1.text().collect::<String>()))
            .find(|text| !text.is_empty());
        if let Some(heading) = heading {
            return heading;
        }
    }

    if let Ok(title_selector) = Selector::parse("title") {
        if let Some(title_element) = document.select(&title_selector).next() {
            return title_element.text().collect::<String>().trim().to_string();
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, Url::parse("https://shop.example/p").unwrap())
    }

    #[test]
    fn itemprop_price_with_companion_currency() {
        let p = page(
            r#"<head><meta itemprop="priceCurrency" content="EUR">
               <meta itemprop="price" content="24,90"></head>"#,
        );
        assert_eq!(extract(&p), Some(PriceReading::new(24.9, "EUR")));
    }

    #[test]
    fn selector_order_decides_not_document_order() {
        let p = page(
            r#"<head><meta name="price" content="$5.00">
               <meta property="product:price:amount" content="17.00">
               <meta property="product:price:currency" content="GBP"></head>"#,
        );
        assert_eq!(extract(&p), Some(PriceReading::new(17.0, "GBP")));
    }

    #[test]
    fn parser_currency_when_no_companion_tag() {
        let p = page(r#"<head><meta name="twitter:data1" content="£12.00"></head>"#);
        assert_eq!(extract(&p), Some(PriceReading::new(12.0, "GBP")));
    }

    #[test]
    fn unparsable_or_empty_content_falls_through() {
        let p = page(
            r#"<head><meta itemprop="price" content="  ">
               <meta property="og:price:amount" content="call us">
               <meta name="price" content="8"></head>"#,
        );
        assert_eq!(extract(&p), Some(PriceReading::new(8.0, "")));

        let p = page(r#"<head><meta itemprop="price" content="0.00"></head>"#);
        assert_eq!(extract(&p), None);
    }

    #[test]
    fn title_fallback_chain() {
        let with_og = page(
            r#"<head><title>Shop | Kettle</title><meta property="og:title" content=" Kettle 1.7L "></head>
               <body><h1>Kettle</h1></body>"#,
        );
        assert_eq!(extract_title(with_og.document()), "Kettle 1.7L");

        let with_h1 = page(
            "<head><title>Shop | Kettle</title></head><body><h1>\n  Steel\n  Kettle </h1></body>",
        );
        assert_eq!(extract_title(with_h1.document()), "Steel Kettle");

        let with_title = page("<head><title> Shop | Kettle </title></head><body><h1> </h1></body>");
        assert_eq!(extract_title(with_title.document()), "Shop | Kettle");

        assert_eq!(extract_title(page("<p>bare</p>").document()), "");
    }
}

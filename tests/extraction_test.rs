use pricewatch::scraping::product_extractor::winning_strategy;
use pricewatch::scraping::StyleResolver;
use pricewatch::{extract_from_html, extract_product_data, Page, ProductSnapshot};
use scraper::ElementRef;
use url::Url;

const URL: &str = "https://shop.example/products/kettle";

fn page(html: &str) -> Page {
    Page::parse(html, Url::parse(URL).unwrap())
}

fn snapshot(html: &str) -> Option<ProductSnapshot> {
    extract_from_html(html, Url::parse(URL).unwrap())
}

const PRODUCT_PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Kettle | Example Shop</title>
  <meta property="og:title" content="Steel Kettle 1.7L">
  <script type="application/ld+json">
    {"@context":"https://schema.org","@type":"Product","name":"Steel Kettle",
     "offers":{"@type":"Offer","price":"10","priceCurrency":"EUR"}}
  </script>
</head>
<body>
  <h1>Steel Kettle</h1>
  <span class="price">$999</span>
</body>
</html>"#;

#[test]
fn structured_data_wins_over_dom() {
    let snap = snapshot(PRODUCT_PAGE).expect("product page");
    assert_eq!(
        snap,
        ProductSnapshot {
            title: "Steel Kettle 1.7L".into(),
            price: 10.0,
            currency: "EUR".into(),
            url: URL.into(),
        }
    );
    assert_eq!(winning_strategy(&page(PRODUCT_PAGE)), Some("structured_data"));
}

#[test]
fn meta_tags_win_over_dom() {
    let html = r#"<html><head>
        <meta property="product:price:amount" content="45.00">
        <meta property="product:price:currency" content="GBP">
      </head><body><h1>Lamp</h1><span class="price">£60.00</span></body></html>"#;
    let snap = snapshot(html).unwrap();
    assert_eq!((snap.price, snap.currency.as_str()), (45.0, "GBP"));
    assert_eq!(snap.title, "Lamp");
    assert_eq!(winning_strategy(&page(html)), Some("meta_tags"));
}

#[test]
fn invalid_structured_price_falls_through() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@type":"Product","offers":{"price":"-5"}}</script>
        <meta itemprop="price" content="12.00">
      </head><body></body></html>"#;
    assert_eq!(snapshot(html).unwrap().price, 12.0);
}

#[test]
fn dom_heuristic_skips_struck_price() {
    let html = r#"<html><head><title>Headphones</title></head><body>
        <div class="pricing">
          <del><span class="price">$79.99</span></del>
          <span class="price">$49.99</span>
        </div>
      </body></html>"#;
    let snap = snapshot(html).unwrap();
    assert_eq!(snap.price, 49.99);
    assert_eq!(snap.currency, "USD");
    assert_eq!(snap.title, "Headphones");
    assert_eq!(winning_strategy(&page(html)), Some("dom_heuristic"));
}

#[test]
fn out_of_range_dom_values_mean_no_product() {
    let html = r#"<html><body>
        <span class="price">$0.01</span>
        <span id="price-sku">50,000,000</span>
      </body></html>"#;
    assert_eq!(snapshot(html), None);
}

#[test]
fn plain_pages_have_no_product() {
    assert_eq!(snapshot("<html><head><title>Blog</title></head><body><p>Hello 2026</p></body></html>"), None);
    assert_eq!(snapshot(""), None);
}

#[test]
fn extraction_is_idempotent() {
    let p = page(PRODUCT_PAGE);
    let first = extract_product_data(&p);
    let second = extract_product_data(&p);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn retailer_markup() {
    let html = r#"<html><head><title>Amazon.com: Widget</title></head><body>
        <span id="productTitle">Widget</span>
        <span class="a-price"><span class="a-offscreen">$23.45</span><span aria-hidden="true">$23<sup>45</sup></span></span>
        <div class="rating">4.5 out of 5</div>
      </body></html>"#;
    let snap = snapshot(html).unwrap();
    assert_eq!(snap.price, 23.45);
    assert_eq!(snap.title, "Amazon.com: Widget");
}

struct NothingRendered;

impl StyleResolver for NothingRendered {
    fn is_visible(&self, _element: ElementRef<'_>) -> bool {
        false
    }
}

#[test]
fn injected_resolver_only_affects_dom_strategy() {
    let dom_only = r#"<html><body><span class="price">$5.00</span></body></html>"#;
    let hidden = page(dom_only).with_style_resolver(NothingRendered);
    assert_eq!(extract_product_data(&hidden), None);

    let structured = page(PRODUCT_PAGE).with_style_resolver(NothingRendered);
    assert_eq!(extract_product_data(&structured).unwrap().price, 10.0);
}

use scraper::{ElementRef, Html};
use url::Url;

/// Decides whether an element would be rendered to the user.
///
/// In a browser this is a `getComputedStyle` lookup; outside one the caller
/// injects whatever approximation it has.
pub trait StyleResolver {
    fn is_visible(&self, element: ElementRef<'_>) -> bool;
}

/// Elements that the user-agent stylesheet never renders.
const NEVER_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "meta", "link", "title", "noscript",
];

/// Visibility from markup alone: the `hidden` attribute, never-rendered
/// elements and inline `style` declarations on the element and its ancestors.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStyleResolver;

impl StyleResolver for InlineStyleResolver {
    fn is_visible(&self, element: ElementRef<'_>) -> bool {
        // Visibility is inherited: the nearest explicit declaration wins.
        let mut visibility_decided = false;

        for el in std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap)) {
            let value = el.value();
            if NEVER_RENDERED.contains(&value.name()) || value.attr("hidden").is_some() {
                return false;
            }
            let Some(style) = value.attr("style") else {
                continue;
            };
            for (property, val) in style_declarations(style) {
                match property.as_str() {
                    "display" if val == "none" => return false,
                    "opacity" if val.parse::<f64>().is_ok_and(|o| o <= 0.0) => return false,
                    "visibility" if !visibility_decided => {
                        if val == "hidden" || val == "collapse" {
                            return false;
                        }
                        visibility_decided = true;
                    }
                    _ => {}
                }
            }
        }
        true
    }
}

/// Split an inline `style` attribute into lowercase `(property, value)` pairs.
pub(crate) fn style_declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let value = value.trim().to_ascii_lowercase();
        let value = value.trim_end_matches("!important").trim().to_string();
        Some((property.trim().to_ascii_lowercase(), value))
    })
}

/// A fully loaded page: parsed document, its address and a style resolver.
pub struct Page {
    document: Html,
    url: Url,
    styles: Box<dyn StyleResolver>,
}

impl Page {
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            url,
            styles: Box::new(InlineStyleResolver),
        }
    }

    /// Builder: swap in a different visibility source.
    pub fn with_style_resolver(mut self, styles: impl StyleResolver + 'static) -> Self {
        self.styles = Box::new(styles);
        self
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_visible(&self, element: ElementRef<'_>) -> bool {
        self.styles.is_visible(element)
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn visible_ids(html: &str) -> Vec<String> {
        let page = Page::parse(html, Url::parse("https://shop.example/").unwrap());
        let sel = Selector::parse("[id]").unwrap();
        page.document()
            .select(&sel)
            .filter(|el| page.is_visible(*el))
            .filter_map(|el| el.value().attr("id").map(str::to_string))
            .collect()
    }

    #[test]
    fn inline_styles_hide_elements() {
        let ids = visible_ids(
            r#"<body>
                <span id="plain">1</span>
                <span id="none" style="display: none">2</span>
                <span id="ghost" style="opacity:0">3</span>
                <span id="hidden-attr" hidden>4</span>
                <div style="DISPLAY:NONE !important"><span id="nested">5</span></div>
                <div style="visibility:hidden"><span id="inherits">6</span></div>
                <div style="visibility:hidden"><span id="override" style="visibility: visible">7</span></div>
                <span id="half" style="opacity: 0.5">8</span>
            </body>"#,
        );
        assert_eq!(ids, vec!["plain", "override", "half"]);
    }

    #[test]
    fn head_content_is_never_visible() {
        let ids = visible_ids(
            r#"<html><head><meta id="m" itemprop="price" content="5"></head>
               <body><meta id="body-meta" itemprop="price" content="5"><p id="p">x</p></body></html>"#,
        );
        assert_eq!(ids, vec!["p"]);
    }

    struct EverythingVisible;

    impl StyleResolver for EverythingVisible {
        fn is_visible(&self, _element: ElementRef<'_>) -> bool {
            true
        }
    }

    #[test]
    fn resolver_can_be_injected() {
        let page = Page::parse(
            r#"<p id="a" style="display:none">x</p>"#,
            Url::parse("https://shop.example/").unwrap(),
        )
        .with_style_resolver(EverythingVisible);
        let sel = Selector::parse("#a").unwrap();
        let el = page.document().select(&sel).next().unwrap();
        assert!(page.is_visible(el));
    }
}

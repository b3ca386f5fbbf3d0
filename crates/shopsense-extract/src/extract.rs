//! Field extraction.
//!
//! Walks a profile's selector chains over a page (or a listing card around a
//! hovered element) and assembles a validated [`ProductRecord`]. Extraction is
//! best-effort and silent: anything missing or malformed yields `None`, never
//! an error surfaced to the hover path.

use shopsense_core::{ProductRecord, SiteId, MAX_FEATURES};
use shopsense_dom::DomQuery;

use crate::classify::host_of;
use crate::price;
use crate::profiles::{id_patterns, profile, SiteProfile};

/// Card-level title markup on listing layouts, where product-page title
/// selectors do not apply.
const CARD_TITLE_SELECTOR: &str = "h2 a span, h2 span, h2, h3, .a-text-normal";

/// Card-level product thumbnails on listing layouts, tried before the
/// product-page image chain when extraction is card-scoped.
const CARD_IMAGE_SELECTOR: &str = "img[data-image-latency], img.s-image";

/// Extracts a product record from `dom`, scoped to the listing card around
/// `anchor` when the page is a listing layout.
pub fn extract<D: DomQuery>(
    dom: &D,
    url: &str,
    site: SiteId,
    anchor: Option<D::Node>,
) -> Option<ProductRecord> {
    let host = host_of(url)?;
    let profile = profile(site);
    let scope = card_scope(dom, url, site, profile, anchor);

    let title = extract_title(dom, scope, profile)?;
    let price = price::resolve(dom, scope, profile, &host)?;
    let product_id = extract_id(dom, url, site, scope).unwrap_or_default();
    let image_url = extract_image(dom, scope, profile);
    let features = extract_features(dom, scope, profile);

    let record = ProductRecord {
        site,
        page_url: url.to_string(),
        product_id,
        title,
        price: price.amount,
        currency: price.currency,
        image_url,
        features,
    };
    match record.validate() {
        Ok(()) => Some(record),
        Err(reason) => {
            tracing::debug!(%reason, url, "extracted record failed validation");
            None
        }
    }
}

/// First hover target on the page per the site's button chain: add-to-cart
/// and buy-now controls, then listing cards. Used when the caller has no
/// specific hovered element.
pub fn find_hover_target<D: DomQuery>(dom: &D, site: SiteId) -> Option<D::Node> {
    profile(site)
        .button_selectors
        .iter()
        .find_map(|selector| dom.query(None, selector))
}

/// Narrows extraction to the listing card containing `anchor`, when the site
/// has card markup and the page is a listing rather than a product page.
/// Amazon product pages reuse card-ish attributes, so cards are only honored
/// on its search layout.
fn card_scope<D: DomQuery>(
    dom: &D,
    url: &str,
    site: SiteId,
    profile: &SiteProfile,
    anchor: Option<D::Node>,
) -> Option<D::Node> {
    let anchor = anchor?;
    if profile.card_selectors.is_empty() {
        return None;
    }
    if site == SiteId::Amazon && !is_search_page(url) {
        return None;
    }
    profile
        .card_selectors
        .iter()
        .find_map(|selector| dom.closest(anchor, selector))
}

fn is_search_page(url: &str) -> bool {
    let path = match url.find("://") {
        Some(split) => {
            let after = &url[split + 3..];
            after.find('/').map_or("", |slash| &after[slash..])
        }
        None => url,
    };
    path.starts_with("/s?") || path == "/s" || path.starts_with("/s/")
}

/// Title chain, then card-level markup inside a scope, then any plausible
/// page heading.
fn extract_title<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    profile: &SiteProfile,
) -> Option<String> {
    for selector in profile.title_selectors {
        if let Some(el) = dom.query(scope, selector) {
            let text = collapse(&dom.text(el));
            if text.len() > 5 {
                return Some(text);
            }
        }
    }

    if scope.is_some() {
        if let Some(el) = dom.query(scope, CARD_TITLE_SELECTOR) {
            let text = collapse(&dom.text(el));
            if text.len() > 5 {
                return Some(text);
            }
        }
    }

    dom.query_all(None, "h1").into_iter().find_map(|el| {
        let text = collapse(&dom.text(el));
        (text.len() > 5 && text.len() < 200).then_some(text)
    })
}

/// Site-scoped product id: URL patterns first, then card attributes.
fn extract_id<D: DomQuery>(
    dom: &D,
    url: &str,
    site: SiteId,
    scope: Option<D::Node>,
) -> Option<String> {
    match site {
        SiteId::Amazon => id_patterns::AMAZON_ASIN
            .captures(url)
            .map(|caps| caps[1].to_uppercase())
            .or_else(|| {
                let carrier = scope.and_then(|node| {
                    dom.closest(node, "[data-asin]")
                        .or_else(|| dom.query(Some(node), "[data-asin]"))
                })?;
                dom.attr(carrier, "data-asin")
                    .filter(|asin| !asin.is_empty())
            }),
        SiteId::Aliexpress => id_patterns::ALIEXPRESS_ITEM
            .captures(url)
            .map(|caps| caps[1].to_string()),
        SiteId::Ebay => id_patterns::EBAY_ITEM
            .captures(url)
            .map(|caps| caps[1].to_string()),
        SiteId::Generic => None,
    }
}

/// First absolute image URL in the chain; lazy-load attributes are checked
/// after `src`.
fn extract_image<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    profile: &SiteProfile,
) -> Option<String> {
    let card_first = scope.is_some().then_some(CARD_IMAGE_SELECTOR);
    for selector in card_first
        .into_iter()
        .chain(profile.image_selectors.iter().copied())
    {
        let Some(el) = dom.query(scope, selector) else {
            continue;
        };
        for attribute in ["src", "data-src", "data-old-src"] {
            if let Some(value) = dom.attr(el, attribute) {
                if value.starts_with("http") {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Deduplicated feature tokens across the profile's feature chains, capped.
fn extract_features<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    profile: &SiteProfile,
) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for selector in profile.feature_selectors {
        for el in dom.query_all(scope, selector) {
            if features.len() >= MAX_FEATURES {
                return features;
            }
            let text = collapse(&dom.text(el));
            if text.len() > 3 && !features.contains(&text) {
                features.push(text);
            }
        }
    }
    features
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopsense_core::Currency;
    use shopsense_dom::HtmlView;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const AMAZON_PRODUCT: &str = r#"
        <html><body>
          <span id="productTitle"> Widget Pro 64GB </span>
          <span class="a-price">
            <span class="a-price-whole">19.</span>
            <span class="a-price-fraction">99</span>
          </span>
          <img id="landingImage" src="https://img.example.com/widget.jpg">
          <div id="feature-bullets"><ul>
            <li><span> Fast   charging </span></li>
            <li><span>ok</span></li>
            <li><span>Fast charging</span></li>
          </ul></div>
        </body></html>
    "#;

    #[test]
    fn amazon_product_page_end_to_end() {
        let dom = HtmlView::parse(AMAZON_PRODUCT);
        let record = extract(
            &dom,
            "https://www.amazon.com/dp/b0widget99?th=1",
            SiteId::Amazon,
            None,
        )
        .unwrap();

        assert_eq!(record.title, "Widget Pro 64GB");
        assert_eq!(record.price, dec("19.99"));
        assert_eq!(record.currency, Currency::Usd);
        assert_eq!(record.product_id, "B0WIDGET99");
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://img.example.com/widget.jpg")
        );
        // collapsed, deduplicated, short tokens dropped
        assert_eq!(record.features, vec!["Fast charging".to_string()]);
    }

    const AMAZON_SEARCH: &str = r#"
        <html><body>
          <div data-component-type="s-search-result" data-asin="B0AAAAAAA1">
            <h2><a><span>First Gadget Alpha</span></a></h2>
            <span class="a-price"><span class="a-price-whole">10</span></span>
          </div>
          <div data-component-type="s-search-result" data-asin="B0BBBBBBB2">
            <h2><a><span>Second Gadget Beta</span></a></h2>
            <span class="a-price"><span class="a-price-whole">20</span></span>
            <img class="s-image" src="https://img.example.com/beta-card.jpg">
            <button id="hover-me">Add to cart</button>
          </div>
        </body></html>
    "#;

    #[test]
    fn listing_card_scopes_extraction_to_the_hovered_card() {
        let dom = HtmlView::parse(AMAZON_SEARCH);
        let anchor = dom.query(None, "#hover-me").unwrap();
        let record = extract(
            &dom,
            "https://www.amazon.com/s?k=gadget",
            SiteId::Amazon,
            Some(anchor),
        )
        .unwrap();

        assert_eq!(record.title, "Second Gadget Beta");
        assert_eq!(record.price, dec("20"));
        assert_eq!(record.product_id, "B0BBBBBBB2");
    }

    #[test]
    fn card_thumbnail_is_picked_up_inside_the_scoped_card() {
        let dom = HtmlView::parse(AMAZON_SEARCH);
        let anchor = dom.query(None, "#hover-me").unwrap();
        let record = extract(
            &dom,
            "https://www.amazon.com/s?k=gadget",
            SiteId::Amazon,
            Some(anchor),
        )
        .unwrap();
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://img.example.com/beta-card.jpg")
        );
    }

    #[test]
    fn hover_target_defaults_to_the_button_chain() {
        let product = HtmlView::parse(
            r#"<html><body>
                 <span id="productTitle">Widget Pro 64GB</span>
                 <input id="add-to-cart-button" type="submit">
               </body></html>"#,
        );
        let target = find_hover_target(&product, SiteId::Amazon).unwrap();
        assert_eq!(product.attr(target, "id").as_deref(), Some("add-to-cart-button"));

        let search = HtmlView::parse(AMAZON_SEARCH);
        let target = find_hover_target(&search, SiteId::Amazon).unwrap();
        // No buy controls on a listing, so the chain falls through to the
        // first listing card.
        assert_eq!(search.attr(target, "data-asin").as_deref(), Some("B0AAAAAAA1"));
    }

    #[test]
    fn card_scoping_is_ignored_on_product_pages() {
        let dom = HtmlView::parse(AMAZON_PRODUCT);
        let anchor = dom.query(None, "#landingImage").unwrap();
        let record = extract(
            &dom,
            "https://www.amazon.com/dp/b0widget99",
            SiteId::Amazon,
            Some(anchor),
        )
        .unwrap();
        assert_eq!(record.title, "Widget Pro 64GB");
    }

    #[test]
    fn generic_page_with_h1_fallback() {
        let html = r#"
            <html><body>
              <h1>Cordless Drill 18V</h1>
              <span class="offer-amount">₪349</span>
            </body></html>
        "#;
        let dom = HtmlView::parse(html);
        let record = extract(&dom, "https://shop.example.com/p/1", SiteId::Generic, None).unwrap();
        assert_eq!(record.title, "Cordless Drill 18V");
        assert_eq!(record.price, dec("349"));
        assert_eq!(record.currency, Currency::Ils);
        assert_eq!(record.product_id, "");
    }

    #[test]
    fn missing_title_or_price_yields_none() {
        let no_title = r#"<html><body><span class="price">$9.99</span></body></html>"#;
        let dom = HtmlView::parse(no_title);
        assert!(extract(&dom, "https://shop.example.com/p/1", SiteId::Generic, None).is_none());

        let no_price = r#"<html><body><h1>Nameable Thing</h1></body></html>"#;
        let dom = HtmlView::parse(no_price);
        assert!(extract(&dom, "https://shop.example.com/p/1", SiteId::Generic, None).is_none());
    }

    #[test]
    fn relative_image_urls_are_skipped() {
        let html = r#"
            <html><body>
              <h1>Widget With Relative Art</h1>
              <span class="price">$5.00</span>
              <img class="product-hero" src="/img/widget.jpg" data-src="https://cdn.example.com/widget.jpg">
            </body></html>
        "#;
        let dom = HtmlView::parse(html);
        let record = extract(&dom, "https://shop.example.com/p/1", SiteId::Generic, None).unwrap();
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://cdn.example.com/widget.jpg")
        );
    }
}

//! Site classification.
//!
//! Decides which extraction profile applies to a page, from the hostname and
//! a handful of structural probes. All DOM probing is best-effort: a page we
//! cannot make sense of classifies as `None`, never as an error.

use shopsense_core::SiteId;
use shopsense_dom::DomQuery;
use url::Url;

/// Hosts that are shopping-adjacent but not product pages (groceries,
/// pharmacies) plus the big non-shopping destinations.
const EXCLUDED_HOSTS: &[&str] = &[
    "super-pharm.co.il",
    "shufersal.co.il",
    "ramilevy.co.il",
    "victory.co.il",
    "google.com",
    "facebook.com",
    "youtube.com",
    "twitter.com",
    "instagram.com",
];

/// Host substring that always resolves to the generic profile, bypassing the
/// supported-sites toggle: it never matches the brand checks but is a product
/// site.
const SPECIAL_GENERIC_HOST: &str = "ksp";

/// Hosts still admitted to the heuristic detector when the support-all
/// toggle is off. The named storefronts appear for completeness; in practice
/// they resolve earlier, so the toggle only widens coverage to the hosted
/// platforms listed after them.
const SUPPORTED_HOSTS: &[&str] = &["amazon", "aliexpress", "ebay", "ksp", "shopify"];

const PRICE_PROBE: &str = r#"[itemprop="price"], .price, [class*="price"], [class*="Price"], [data-price], [id*="price"], [class*="cost"], [class*="Cost"]"#;

const TITLE_PROBE: &str = r#"h1, h2, h3, [itemprop="name"], [class*="product-title"], [class*="productTitle"], [class*="product-name"], .product-name, h1[class*="title"], [id*="title"], [class*="item"] h2, [class*="item"] h3, [class*="product"] h2, [class*="product"] h3"#;

const BUTTON_PROBE: &str = r#"button[class*="cart"], button[class*="buy"], button[class*="add"], [class*="add-to-cart"], [aria-label*="cart"], [aria-label*="buy"], button[type="button"]"#;

/// Classification inputs that used to be ambient globals.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// When false, pages that match no named storefront are rejected without
    /// running the heuristic detector.
    pub support_all_sites: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        ClassifyOptions {
            support_all_sites: true,
        }
    }
}

/// Determines the site profile for a page, or `None` when the page should be
/// left alone.
///
/// Priority: denylist, then named storefronts (amazon, aliexpress, ebay, the
/// special-cased generic host), then, if permitted, the heuristic
/// product-page detector.
pub fn classify<D: DomQuery>(url: &str, dom: &D, options: &ClassifyOptions) -> Option<SiteId> {
    let host = host_of(url)?;

    if EXCLUDED_HOSTS.iter().any(|excluded| host.contains(excluded)) {
        tracing::debug!(%host, "excluded host");
        return None;
    }

    if host.contains("amazon") {
        return Some(SiteId::Amazon);
    }
    if host.contains("aliexpress") {
        return Some(SiteId::Aliexpress);
    }
    if host.contains("ebay") {
        return Some(SiteId::Ebay);
    }
    if host.contains(SPECIAL_GENERIC_HOST) {
        tracing::debug!(%host, "special-cased generic host");
        return Some(SiteId::Generic);
    }

    if !options.support_all_sites
        && !SUPPORTED_HOSTS
            .iter()
            .any(|supported| host.contains(supported))
    {
        return None;
    }

    // Heuristic product-page detector: independent structural signals, two
    // of three required.
    let has_price = dom.query(None, PRICE_PROBE).is_some();
    let has_title = dom.query(None, TITLE_PROBE).is_some();
    let has_button = dom.query(None, BUTTON_PROBE).is_some();
    let primary = u8::from(has_price) + u8::from(has_title) + u8::from(has_button);

    if primary >= 2 {
        tracing::debug!(%host, primary, "heuristic product page");
        return Some(SiteId::Generic);
    }

    // Secondary signal set, only honored on the special host family: a
    // currency glyph anywhere in the body, or a clickable element carrying
    // vector-icon markup.
    if host.contains(SPECIAL_GENERIC_HOST) {
        let glyph = dom.body_text().contains('₪');
        let icon_button = dom
            .query_all(None, "button, div, a")
            .into_iter()
            .any(|el| dom.query(Some(el), "svg").is_some());
        if u8::from(glyph) + u8::from(icon_button) >= 1 {
            return Some(SiteId::Generic);
        }
    }

    None
}

/// Lowercased hostname of a URL, without scheme, port, path, or query.
/// Scheme-less inputs are treated as https.
pub(crate) fn host_of(raw: &str) -> Option<String> {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{raw}")).ok()?,
        Err(_) => return None,
    };
    parsed.host_str().map(str::to_lowercase)
}

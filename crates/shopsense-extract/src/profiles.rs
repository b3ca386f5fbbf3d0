//! Per-site extraction profiles.
//!
//! Each storefront family is described by ordered selector chains rather than
//! site-specific code paths; adding a site means adding a table entry.
//! Selectors earlier in a chain target current markup, later ones older
//! generations, and the first hit wins. Update a chain when a storefront ships
//! new markup and a fixture stops extracting.

use std::sync::LazyLock;

use regex::Regex;
use shopsense_core::SiteId;

/// Ordered selector chains for one storefront family. Immutable, defined at
/// startup.
pub struct SiteProfile {
    pub id: SiteId,
    /// Hover targets: add-to-cart / buy-now controls and listing cards.
    pub button_selectors: &'static [&'static str],
    pub title_selectors: &'static [&'static str],
    pub price_selectors: &'static [&'static str],
    pub image_selectors: &'static [&'static str],
    /// Bullet/spec markup for feature tokens; empty when the site has none
    /// worth harvesting.
    pub feature_selectors: &'static [&'static str],
    /// Listing-card boundaries used to scope extraction on search layouts.
    pub card_selectors: &'static [&'static str],
}

static AMAZON: SiteProfile = SiteProfile {
    id: SiteId::Amazon,
    button_selectors: &[
        "#add-to-cart-button",
        "#buy-now-button",
        r#"[name="submit.add-to-cart"]"#,
        r#"[data-action="add-to-cart"]"#,
        r#"input[aria-labelledby="submit.add-to-cart-announce"]"#,
        r#"button[aria-labelledby*="add-to-cart"]"#,
        "#add-to-wishlist-button",
        r#"button[aria-label*="wishlist"]"#,
        r#"div[data-component-type="s-search-result"]"#,
        "[data-asin] h2 a",
        ".s-result-item",
    ],
    title_selectors: &[
        "#productTitle",
        "h1.a-size-large",
        "h1#title",
        "span#productTitle",
    ],
    price_selectors: &[
        ".a-price-whole",
        ".a-price .a-offscreen",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        ".a-price-now",
        "span.a-price",
    ],
    image_selectors: &[
        "#landingImage",
        "#imgBlkFront",
        "#main-image",
        ".a-dynamic-image",
        r#"img[data-a-image-name="landingImage"]"#,
    ],
    feature_selectors: &[
        "#feature-bullets li span",
        "#feature-bullets li",
        "#productDetails_techSpec_section_1 tr",
        "#productDetails_techSpec_section_2 tr",
    ],
    card_selectors: &[
        r#"div[data-component-type="s-search-result"]"#,
        "[data-asin]",
        ".s-result-item",
    ],
};

static EBAY: SiteProfile = SiteProfile {
    id: SiteId::Ebay,
    button_selectors: &[
        "#atcBtn",
        "#binBtn",
        r#"[data-testid="ux-call-to-action"]"#,
        ".ux-call-to-action",
        r#"[data-testid="binBtn"]"#,
        r#"[data-testid="atcBtn"]"#,
        r#"[data-testid="watchBtn"]"#,
        r#"[data-testid="addToCartBtn"]"#,
        ".s-item",
        r#"[data-testid="s-item"]"#,
    ],
    title_selectors: &[
        r#"h1[data-testid="x-item-title-label"]"#,
        r#"h1[id*="itemTitle"]"#,
        "h1.itemTitle",
        r#"h1[class*="item-title"]"#,
        "#ebay-item-title",
        "h1",
    ],
    price_selectors: &[
        r#"[data-testid="x-price-primary"]"#,
        ".notranslate",
        r#"[itemprop="price"]"#,
        ".u-flL.condText",
        r#"[class*="price"]"#,
        r#"[id*="price"]"#,
    ],
    image_selectors: &[
        "#icImg",
        r#"[data-testid="ux-image-carousel-item"] img"#,
        ".ux-image-carousel-item img",
        r#"img[itemprop="image"]"#,
    ],
    feature_selectors: &[],
    card_selectors: &[],
};

static ALIEXPRESS: SiteProfile = SiteProfile {
    id: SiteId::Aliexpress,
    button_selectors: &[
        ".addcart-btn",
        ".buynow-btn",
        r#"[data-role="addToCart"]"#,
        "button.add-to-cart",
        "button.buy-now",
        r#"button[class*="AddToCart"]"#,
        r#"button[class*="BuyNow"]"#,
        r#"[class*="add-to-cart"]"#,
        r#"[class*="buy-now"]"#,
        ".pdp-action-button",
        r#"button[aria-label*="cart"]"#,
        r#"button[aria-label*="buy"]"#,
    ],
    title_selectors: &[
        "h1.product-title-text",
        ".product-title-text",
        r#"h1[itemprop="name"]"#,
        r#"h1[data-pl="product-title"]"#,
        r#"[data-pl="product-title"]"#,
        "h1.pdp-product-name",
        r#"h1[class*="title"]"#,
        r#"[class*="product-title"]"#,
        "h1",
    ],
    price_selectors: &[
        ".product-price-value",
        ".price-current",
        r#"[itemprop="price"]"#,
        ".notranslate.price",
        r#"[data-pl="product-price"]"#,
        ".pdp-price",
        r#"[class*="price-current"]"#,
        r#"[class*="price-value"]"#,
        r#"[class*="product-price"]"#,
        ".price",
        r#"[class*="price"]"#,
    ],
    image_selectors: &[
        ".images-view-item img",
        ".magnifier-image",
        "#j-image-thumb-wrap img",
        ".product-image img",
    ],
    feature_selectors: &[
        r#"[class*="spec"] li"#,
        r#"[data-pl="product-specs"] li"#,
        r#"[data-pl="product-specs"] div"#,
    ],
    card_selectors: &[],
};

static GENERIC: SiteProfile = SiteProfile {
    id: SiteId::Generic,
    button_selectors: &[
        r#"button[class*="cart"]"#,
        r#"button[class*="Cart"]"#,
        r#"button[class*="buy"]"#,
        r#"button[class*="Buy"]"#,
        r#"button[class*="add"]"#,
        r#"[class*="add-to-cart"]"#,
        r#"a[class*="cart"]"#,
        r#"[data-action*="cart"]"#,
        r#"[aria-label*="cart"]"#,
        r#"[aria-label*="buy"]"#,
        // Hebrew add-to-cart titles on the special-cased regional retailer.
        r#"[title*="הוסף לעגלה"]"#,
        r#"[title*="הוספה לעגלה"]"#,
        r#"[title*="הוסף לסל"]"#,
        r#"button[type="button"]"#,
        r#"button[type="submit"]"#,
    ],
    title_selectors: &[
        "h1",
        r#"[itemprop="name"]"#,
        r#"[class*="product-title"]"#,
        r#"[class*="productTitle"]"#,
        r#"[class*="product-name"]"#,
        ".product-name",
        r#"h1[class*="title"]"#,
        r#"[id*="title"]"#,
        r#"[class*="product"] h2"#,
        r#"[class*="product"] h3"#,
        r#"[class*="item"] h2"#,
        r#"[class*="item"] h3"#,
    ],
    price_selectors: &[
        r#"[itemprop="price"]"#,
        r#"[class*="price"]"#,
        r#"[class*="Price"]"#,
        ".price",
        "[data-price]",
        r#"[id*="price"]"#,
        r#"div[class*="cost"]"#,
        r#"div[class*="Cost"]"#,
        r#"[class*="amount"]"#,
        r#"[class*="Amount"]"#,
    ],
    image_selectors: &[
        r#"img[class*="product"]"#,
        r#"img[class*="Product"]"#,
        r#"[itemprop="image"] img"#,
        ".product-image img",
        r#"[class*="main-image"] img"#,
        r#"img[class*="main"]"#,
    ],
    feature_selectors: &[],
    card_selectors: &[
        r#"[class*="product"]"#,
        r#"[class*="item"]"#,
        r#"[class*="card"]"#,
        r#"div[class*="Product"]"#,
    ],
};

/// Profile lookup for a classified site.
#[must_use]
pub fn profile(site: SiteId) -> &'static SiteProfile {
    match site {
        SiteId::Amazon => &AMAZON,
        SiteId::Ebay => &EBAY,
        SiteId::Aliexpress => &ALIEXPRESS,
        SiteId::Generic => &GENERIC,
    }
}

/// URL patterns yielding the site-scoped product identifier.
pub mod id_patterns {
    use super::{LazyLock, Regex};

    /// 10-character alphanumeric code in a `/dp/` path segment.
    pub static AMAZON_ASIN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/dp/([A-Za-z0-9]{10})(?:[/?]|$)").expect("valid regex"));

    /// Numeric item id in an `/item/<id>.html` segment.
    pub static ALIEXPRESS_ITEM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/item/(\d+)\.html").expect("valid regex"));

    /// Numeric item id in an `/itm/<id>` segment.
    pub static EBAY_ITEM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/itm/(\d+)").expect("valid regex"));
}

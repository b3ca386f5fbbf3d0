//! Price normalization.
//!
//! Turns heterogeneous price markup into a canonical (amount, currency) pair.
//! Strategies run in priority order: split-price reconstruction, currency
//! glyph sniffing over text and attributes, a currency-less fallback with
//! site defaults, the special label/max path for the regional retailer
//! without reliable price markup, and a broadened class-based retry.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use shopsense_core::{Currency, SiteId};
use shopsense_dom::DomQuery;

use crate::profiles::SiteProfile;

/// A successfully resolved price. The amount is always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub amount: Decimal,
    pub currency: Currency,
}

/// A provisionally parsed price with selection metadata, produced during the
/// special per-site path and discarded after resolution.
struct PriceCandidate {
    raw_text: String,
    value: Decimal,
    currency_hint: Option<Currency>,
    struck_through: bool,
    special_label: bool,
    /// 1 = labeled regional price (always wins), 2 = plain price.
    priority: u8,
}

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9,]*\.?[0-9]*").expect("valid regex"));

/// Shekel amounts must sit adjacent to the glyph; a bare number elsewhere in
/// the text is not a shekel price.
static SHEKEL_ADJACENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"₪\s*([0-9][0-9,]*\.?[0-9]*)|([0-9][0-9,]*\.?[0-9]*)\s*₪").expect("valid regex")
});

/// Ancestor class fragments that mark a price as the crossed-out "was" price.
const STRIKE_ANCESTORS: &[&str] = &[
    r#"[style*="line-through"]"#,
    r#"[class*="strike"]"#,
    r#"[class*="old"]"#,
    r#"[class*="original"]"#,
    r#"[class*="crossed"]"#,
    r#"[class*="deleted"]"#,
];

/// Foreground colors storefronts use for de-emphasized prices.
const GREY_MARKERS: &[&str] = &["rgb(128", "rgb(150", "rgb(169", "gray", "#808080", "#999999"];

/// Resolves the price for a scope, or `None` when nothing parseable and
/// positive is found.
pub fn resolve<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    profile: &SiteProfile,
    host: &str,
) -> Option<ResolvedPrice> {
    let site = profile.id;
    let default = default_currency(site, host);
    let special_site = site == SiteId::Generic && host.contains("ksp");

    let resolved = if special_site {
        resolve_special(dom, scope).or_else(|| special_class_fallback(dom, scope))
    } else {
        selector_chain(dom, scope, profile, default)
            .or_else(|| {
                if site == SiteId::Aliexpress {
                    numeric_fallback(dom, scope, default)
                } else {
                    None
                }
            })
            .or_else(|| glyph_fallback(dom, scope))
    };

    resolved.filter(|price| price.amount > Decimal::ZERO)
}

/// Default currency when no glyph decides: eBay lists in dollars, the `.com`
/// Amazon storefront in dollars, everything else in scope in shekels.
pub(crate) fn default_currency(site: SiteId, host: &str) -> Currency {
    match site {
        SiteId::Ebay => Currency::Usd,
        SiteId::Amazon if host.contains("amazon.com") => Currency::Usd,
        _ => Currency::Ils,
    }
}

/// Walks the profile's price selector chain; first parseable element wins.
fn selector_chain<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    profile: &SiteProfile,
    default: Currency,
) -> Option<ResolvedPrice> {
    for selector in profile.price_selectors {
        let Some(el) = dom.query(scope, selector) else {
            continue;
        };

        let mut text = dom.text(el).trim().to_string();
        if profile.id == SiteId::Amazon {
            // Amazon renders the price as separate whole/fraction fragments;
            // recombine before parsing.
            if let Some(combined) = split_price_text(dom, el) {
                text = combined;
            }
        }

        let sources = [Some(text), dom.attr(el, "aria-label"), dom.attr(el, "content")];
        for source in sources.into_iter().flatten() {
            if let Some((amount, hint)) = sniff(&source) {
                return Some(ResolvedPrice {
                    amount,
                    currency: hint.unwrap_or(default),
                });
            }
        }
    }
    None
}

/// Recombines `a-price-whole` / `a-price-fraction` fragments into one decimal
/// string, whether the matched element is the whole part or the wrapper.
fn split_price_text<D: DomQuery>(dom: &D, el: D::Node) -> Option<String> {
    let digits = |raw: String| -> String { raw.chars().filter(char::is_ascii_digit).collect() };

    let (whole_el, fraction_el) = if dom.matches(el, ".a-price-whole") {
        let wrapper = dom.closest(el, ".a-price");
        let fraction = wrapper.and_then(|w| dom.query(Some(w), ".a-price-fraction"));
        (Some(el), fraction)
    } else if dom.matches(el, ".a-price") {
        (
            dom.query(Some(el), ".a-price-whole"),
            dom.query(Some(el), ".a-price-fraction"),
        )
    } else {
        return None;
    };

    let whole = digits(dom.text(whole_el?));
    if whole.is_empty() {
        return None;
    }
    let fraction = fraction_el.map(|f| digits(dom.text(f))).unwrap_or_default();
    Some(if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    })
}

/// Special path for the regional retailer: collect every shekel-bearing
/// element, let an explicit regional-price label always win, drop struck or
/// greyed-out plain prices, and among the survivors pick the maximum value;
/// the minimum risks being a secondary/decoy price rather than the listed one.
fn resolve_special<D: DomQuery>(dom: &D, scope: Option<D::Node>) -> Option<ResolvedPrice> {
    let mut candidates: Vec<PriceCandidate> = Vec::new();

    for el in dom.query_all(scope, "*") {
        let text = dom.text(el);
        if !text.contains('₪') {
            continue;
        }

        // Only the innermost shekel-bearing element counts: a container's
        // concatenated text would smuggle a crossed-out price past the style
        // checks below and misattribute the regional-price label.
        if dom
            .query_all(Some(el), "*")
            .into_iter()
            .any(|child| dom.text(child).contains('₪'))
        {
            continue;
        }

        if text.contains("אילת") {
            if let Some(value) = shekel_amount(&text) {
                candidates.push(PriceCandidate {
                    raw_text: clip(&text),
                    value,
                    currency_hint: Some(Currency::Ils),
                    struck_through: false,
                    special_label: true,
                    priority: 1,
                });
            }
            continue;
        }

        if is_struck(dom, el) || is_greyed(dom, el) {
            continue;
        }
        if let Some(value) = shekel_amount(&text) {
            candidates.push(PriceCandidate {
                raw_text: clip(&text),
                value,
                currency_hint: Some(Currency::Ils),
                struck_through: false,
                special_label: false,
                priority: 2,
            });
        }
    }

    candidates.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.value.cmp(&a.value))
    });
    let winner = candidates.first()?;
    debug_assert!(!winner.struck_through);
    tracing::debug!(
        raw = %winner.raw_text,
        value = %winner.value,
        label = winner.special_label,
        "special-path price selected"
    );
    Some(ResolvedPrice {
        amount: winner.value,
        currency: winner.currency_hint.unwrap_or(Currency::Ils),
    })
}

/// Last-resort pass for the special site: price-ish classes, skipping struck
/// elements and the "original price" label.
fn special_class_fallback<D: DomQuery>(dom: &D, scope: Option<D::Node>) -> Option<ResolvedPrice> {
    for selector in [
        r#"[class*="price"]"#,
        r#"[class*="Price"]"#,
        r#"[class*="מחיר"]"#,
    ] {
        for el in dom.query_all(scope, selector) {
            if dom.computed_style(el).line_through {
                continue;
            }
            let text = dom.text(el);
            if text.contains('₪') && (text.contains("אילת") || !text.contains("מחיר מקורי")) {
                if let Some(value) = shekel_amount(&text) {
                    return Some(ResolvedPrice {
                        amount: value,
                        currency: Currency::Ils,
                    });
                }
            }
        }
    }
    None
}

/// Any numeric run in price-ish elements, with the site default currency.
fn numeric_fallback<D: DomQuery>(
    dom: &D,
    scope: Option<D::Node>,
    default: Currency,
) -> Option<ResolvedPrice> {
    let elements = dom.query_all(
        scope,
        r#"[class*="price"], [class*="Price"], [id*="price"]"#,
    );
    for el in elements {
        let sources = [Some(dom.text(el)), dom.attr(el, "content")];
        for source in sources.into_iter().flatten() {
            if let Some(amount) = first_amount(&source) {
                return Some(ResolvedPrice {
                    amount,
                    currency: default,
                });
            }
        }
    }
    None
}

/// Broadened glyph-only search: price-ish elements anywhere in scope, but a
/// currency marker is required.
fn glyph_fallback<D: DomQuery>(dom: &D, scope: Option<D::Node>) -> Option<ResolvedPrice> {
    let elements = dom.query_all(
        scope,
        r#"[class*="price"], [class*="Price"], [id*="price"], [data-testid*="price"]"#,
    );
    for el in elements {
        let sources = [
            Some(dom.text(el)),
            dom.attr(el, "content"),
            dom.attr(el, "aria-label"),
        ];
        for source in sources.into_iter().flatten() {
            if has_dollar_marker(&source) {
                if let Some(amount) = first_amount(&source) {
                    return Some(ResolvedPrice {
                        amount,
                        currency: Currency::Usd,
                    });
                }
            }
            if has_shekel_marker(&source) {
                if let Some(amount) = shekel_amount(&source) {
                    return Some(ResolvedPrice {
                        amount,
                        currency: Currency::Ils,
                    });
                }
            }
        }
    }
    None
}

/// Currency-glyph sniffing over one text source. Returns the parsed amount
/// and a currency hint when a glyph family matched; `None` hint means the
/// caller's site default applies.
fn sniff(text: &str) -> Option<(Decimal, Option<Currency>)> {
    if has_dollar_marker(text) {
        if let Some(amount) = first_amount(text) {
            return Some((amount, Some(Currency::Usd)));
        }
    }
    if has_shekel_marker(text) {
        if let Some(amount) = shekel_amount(text) {
            return Some((amount, Some(Currency::Ils)));
        }
    }
    first_amount(text).map(|amount| (amount, None))
}

fn has_dollar_marker(text: &str) -> bool {
    text.contains('$') || text.contains("USD")
}

fn has_shekel_marker(text: &str) -> bool {
    text.contains('₪') || text.contains("ILS") || text.contains("NIS")
}

/// First numeric run, thousands separators stripped, decimal point kept.
fn first_amount(text: &str) -> Option<Decimal> {
    NUMERIC_RUN
        .find(text)
        .and_then(|m| parse_amount(m.as_str()))
}

fn shekel_amount(text: &str) -> Option<Decimal> {
    let caps = SHEKEL_ADJACENT.captures(text)?;
    let run = caps.get(1).or_else(|| caps.get(2))?;
    parse_amount(run.as_str())
}

fn parse_amount(run: &str) -> Option<Decimal> {
    run.replace(',', "")
        .trim_end_matches('.')
        .parse::<Decimal>()
        .ok()
}

fn is_struck<D: DomQuery>(dom: &D, el: D::Node) -> bool {
    if dom.computed_style(el).line_through {
        return true;
    }
    STRIKE_ANCESTORS
        .iter()
        .any(|selector| dom.closest(el, selector).is_some())
}

fn is_greyed<D: DomQuery>(dom: &D, el: D::Node) -> bool {
    let Some(color) = dom.computed_style(el).color else {
        return false;
    };
    GREY_MARKERS.iter().any(|marker| color.contains(marker))
}

fn clip(text: &str) -> String {
    text.trim().chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::profile;
    use shopsense_dom::HtmlView;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn resolve_with(html: &str, site: SiteId, host: &str) -> Option<ResolvedPrice> {
        let dom = HtmlView::parse(html);
        resolve(&dom, None, profile(site), host)
    }

    #[test]
    fn dollar_glyph_with_thousands_separator() {
        let got = resolve_with(
            r#"<html><body><span class="price">$1,234.56</span></body></html>"#,
            SiteId::Generic,
            "shop.example.com",
        )
        .unwrap();
        assert_eq!(got.amount, dec("1234.56"));
        assert_eq!(got.currency, Currency::Usd);
    }

    #[test]
    fn shekel_glyph_is_ils() {
        let got = resolve_with(
            r#"<html><body><span class="price">₪199</span></body></html>"#,
            SiteId::Generic,
            "shop.example.com",
        )
        .unwrap();
        assert_eq!(got.amount, dec("199"));
        assert_eq!(got.currency, Currency::Ils);
    }

    #[test]
    fn bare_number_takes_site_default() {
        let ebay = resolve_with(
            r#"<html><body><span class="display-price">1234</span></body></html>"#,
            SiteId::Ebay,
            "www.ebay.com",
        )
        .unwrap();
        assert_eq!(ebay.amount, dec("1234"));
        assert_eq!(ebay.currency, Currency::Usd);

        let generic = resolve_with(
            r#"<html><body><span class="price">1234</span></body></html>"#,
            SiteId::Generic,
            "shop.example.com",
        )
        .unwrap();
        assert_eq!(generic.currency, Currency::Ils);
    }

    #[test]
    fn amazon_split_price_is_recombined() {
        let html = r#"
            <html><body>
              <span class="a-price">
                <span class="a-price-whole">19.</span>
                <span class="a-price-fraction">99</span>
              </span>
            </body></html>
        "#;
        let got = resolve_with(html, SiteId::Amazon, "www.amazon.com").unwrap();
        assert_eq!(got.amount, dec("19.99"));
        assert_eq!(got.currency, Currency::Usd);
    }

    #[test]
    fn aria_label_is_sniffed_when_text_is_empty() {
        let html = r#"<html><body><span class="price" aria-label="$49.99"></span></body></html>"#;
        let got = resolve_with(html, SiteId::Generic, "shop.example.com").unwrap();
        assert_eq!(got.amount, dec("49.99"));
        assert_eq!(got.currency, Currency::Usd);
    }

    #[test]
    fn glyph_fallback_catches_unlisted_markup() {
        // Nothing in the amazon chain matches, but a price-ish class exists.
        let html = r#"<html><body><div class="deal-price-banner">$5.00</div></body></html>"#;
        let got = resolve_with(html, SiteId::Amazon, "www.amazon.com").unwrap();
        assert_eq!(got.amount, dec("5.00"));
        assert_eq!(got.currency, Currency::Usd);
    }

    #[test]
    fn zero_and_unparseable_prices_fail() {
        assert!(resolve_with(
            r#"<html><body><span class="price">$0.00</span></body></html>"#,
            SiteId::Generic,
            "shop.example.com",
        )
        .is_none());
        assert!(resolve_with(
            r#"<html><body><span class="price">call us</span></body></html>"#,
            SiteId::Generic,
            "shop.example.com",
        )
        .is_none());
    }

    // ------------------------------------------------------------------
    // Special per-site path
    // ------------------------------------------------------------------

    #[test]
    fn struck_price_never_beats_plain_price() {
        let html = r#"
            <html><body><div class="row">
              <span style="text-decoration: line-through">₪399</span>
              <span>₪299</span>
            </div></body></html>
        "#;
        let got = resolve_with(html, SiteId::Generic, "ksp.co.il").unwrap();
        assert_eq!(got.amount, dec("299"));
        assert_eq!(got.currency, Currency::Ils);
    }

    #[test]
    fn greyed_out_price_is_rejected() {
        let html = r#"
            <html><body><div class="row">
              <span style="color: #999999">₪450</span>
              <span>₪299</span>
            </div></body></html>
        "#;
        let got = resolve_with(html, SiteId::Generic, "ksp.co.il").unwrap();
        assert_eq!(got.amount, dec("299"));
    }

    #[test]
    fn maximum_plain_price_wins() {
        let html = r#"
            <html><body><div class="row">
              <span>₪49</span>
              <span>₪1,299</span>
              <span>₪99</span>
            </div></body></html>
        "#;
        let got = resolve_with(html, SiteId::Generic, "ksp.co.il").unwrap();
        assert_eq!(got.amount, dec("1299"));
    }

    #[test]
    fn labeled_regional_price_outranks_any_plain_price() {
        let html = r#"
            <html><body><div class="row">
              <span>₪1,299</span>
              <span class="eilat">מחיר אילת ₪1,110</span>
            </div></body></html>
        "#;
        let got = resolve_with(html, SiteId::Generic, "ksp.co.il").unwrap();
        assert_eq!(got.amount, dec("1110"));
    }

    #[test]
    fn strike_class_ancestor_rejects_the_price() {
        let html = r#"
            <html><body>
              <div class="old-price"><span>₪999</span></div>
              <div class="now"><span>₪799</span></div>
            </body></html>
        "#;
        let got = resolve_with(html, SiteId::Generic, "ksp.co.il").unwrap();
        assert_eq!(got.amount, dec("799"));
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    #[test]
    fn shekel_requires_adjacency() {
        assert_eq!(shekel_amount("₪ 199"), Some(dec("199")));
        assert_eq!(shekel_amount("199 ₪"), Some(dec("199")));
        assert_eq!(shekel_amount("save 199 with ILS"), None);
    }

    #[test]
    fn default_currency_table() {
        assert_eq!(default_currency(SiteId::Ebay, "www.ebay.co.uk"), Currency::Usd);
        assert_eq!(
            default_currency(SiteId::Amazon, "www.amazon.com"),
            Currency::Usd
        );
        assert_eq!(
            default_currency(SiteId::Amazon, "www.amazon.co.il"),
            Currency::Ils
        );
        assert_eq!(
            default_currency(SiteId::Generic, "shop.example.com"),
            Currency::Ils
        );
    }
}

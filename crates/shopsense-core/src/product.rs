use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of feature tokens carried on a [`ProductRecord`].
pub const MAX_FEATURES: usize = 25;

/// Storefront family a page was classified as.
///
/// `Generic` covers both the special-cased regional retailer (ksp) and any
/// page that passed the heuristic product-page detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    Amazon,
    Ebay,
    Aliexpress,
    Generic,
}

impl SiteId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SiteId::Amazon => "amazon",
            SiteId::Ebay => "ebay",
            SiteId::Aliexpress => "aliexpress",
            SiteId::Generic => "generic",
        }
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currencies the normalizer can resolve. Closed set today, extensible by
/// adding a variant plus its glyph family in the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Ils,
}

impl Currency {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ils => "ILS",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Ils => "₪",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Advice languages understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    He,
    En,
    Ar,
    Ru,
    Es,
    Fr,
    De,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::He => "he",
            Language::En => "en",
            Language::Ar => "ar",
            Language::Ru => "ru",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }

    /// Maps a browser locale (`"he-IL"`, `"en_US"`, legacy `"iw"`) onto the
    /// supported set. Unrecognized locales default to English.
    #[must_use]
    pub fn from_locale(locale: &str) -> Self {
        let code = locale
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        match code.as_str() {
            // "iw" is the pre-1989 ISO code Hebrew still reports in some UAs.
            "he" | "iw" => Language::He,
            "ar" => Language::Ar,
            "ru" => Language::Ru,
            "es" => Language::Es,
            "fr" => Language::Fr,
            "de" => Language::De,
            _ => Language::En,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "he" => Ok(Language::He),
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            "ru" => Ok(Language::Ru),
            "es" => Ok(Language::Es),
            "fr" => Ok(Language::Fr),
            "de" => Ok(Language::De),
            other => Err(RecordError::UnknownLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured product sensed from a page, created per hover and never
/// persisted.
///
/// Wire names match the advice provider's `productData` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub site: SiteId,
    pub page_url: String,
    /// Site-scoped external identifier (ASIN, item id). Informational only;
    /// empty when no pattern matched.
    #[serde(default)]
    pub product_id: String,
    pub title: String,
    pub price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ProductRecord {
    /// Checks the record invariant: non-empty title and strictly positive
    /// price. Extraction only constructs records that pass this, but the
    /// orchestrator re-validates before spending quota.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptyTitle`] or [`RecordError::InvalidPrice`].
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.title.trim().is_empty() {
            return Err(RecordError::EmptyTitle);
        }
        if self.price <= Decimal::ZERO {
            return Err(RecordError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("product title is empty")]
    EmptyTitle,

    #[error("price {0} is not a positive amount")]
    InvalidPrice(Decimal),

    #[error("unknown language code: {0}")]
    UnknownLanguage(String),
}

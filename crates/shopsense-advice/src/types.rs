//! Wire types for the advisory API.
//!
//! Field names follow the backend's JSON contract, hence the camelCase
//! renames. Response sections are all defaulted: the backend omits whatever
//! it could not analyze and the overlay renders what is present.

use serde::{Deserialize, Serialize};
use shopsense_core::{Currency, Language, ProductRecord, UsageSnapshot};

/// Request body for the `analyze` endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    pub product_data: ProductRecord,
    pub language: Language,
    pub currency: Currency,
}

/// Raw response envelope from the advisory backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdviceEnvelope {
    pub success: bool,
    pub sales_advice: Option<SalesAdvice>,
    pub usage: Option<UsageSnapshot>,
    pub error: Option<String>,
    pub details: Option<String>,
}

/// The advisory payload rendered into the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesAdvice {
    pub product_overview: ProductOverview,
    pub buying_advice: BuyingAdvice,
    pub competitors: Vec<Competitor>,
    pub best_brand: BestBrand,
    pub aliexpress_alternative: AliexpressAlternative,
    pub new_model_timing: NewModelTiming,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOverview {
    pub description: String,
    pub target_audience: String,
    pub category: String,
    pub main_features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyingAdvice {
    pub is_good_time_to_buy: String,
    pub recommendation: String,
    pub price_assessment: String,
    pub wait_for_sale: bool,
    pub next_sale_date: String,
    pub expected_sale_price: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Competitor {
    pub name: String,
    pub price: Option<String>,
    pub comparison: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BestBrand {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub model_number: Option<String>,
    pub price: Option<String>,
    pub reason: Option<String>,
    pub key_advantages: Vec<String>,
    pub current_product_comparison: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AliexpressAlternative {
    pub available: bool,
    pub recommendation: String,
    pub price: Option<String>,
    pub quality_assessment: Option<String>,
    pub search_keywords: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewModelTiming {
    pub expected_soon: bool,
    pub should_wait: bool,
    pub reasoning: String,
}

impl SalesAdvice {
    /// Static payload shown when the backend cannot be reached, so the
    /// overlay always has something well-formed to render.
    #[must_use]
    pub fn unavailable() -> Self {
        SalesAdvice {
            product_overview: ProductOverview {
                description: "Unable to provide overview at this time. Server may be unavailable."
                    .to_string(),
                target_audience: "Unknown".to_string(),
                category: "Unknown".to_string(),
                main_features: Vec::new(),
            },
            buying_advice: BuyingAdvice {
                is_good_time_to_buy: "maybe".to_string(),
                recommendation:
                    "Unable to analyze at this time - please check manually or try again later."
                        .to_string(),
                price_assessment: "Unknown".to_string(),
                wait_for_sale: false,
                next_sale_date: "Unknown".to_string(),
                expected_sale_price: "Unknown".to_string(),
            },
            competitors: Vec::new(),
            best_brand: BestBrand::default(),
            aliexpress_alternative: AliexpressAlternative {
                available: false,
                recommendation: "Unable to analyze".to_string(),
                price: None,
                quality_assessment: None,
                search_keywords: None,
            },
            new_model_timing: NewModelTiming {
                expected_soon: false,
                should_wait: false,
                reasoning: "Unable to analyze".to_string(),
            },
        }
    }
}

//! Product sensing: site classification, field extraction, and price
//! normalization over a [`shopsense_dom::DomQuery`] page view.
//!
//! The pipeline is table-driven. [`classify`] picks a [`SiteProfile`] for a
//! page, [`extract`] walks that profile's selector chains into a validated
//! [`shopsense_core::ProductRecord`], and [`price::resolve`] turns price
//! markup into a canonical amount and currency.

mod classify;
mod extract;
pub mod price;
pub mod profiles;

pub use classify::{classify, ClassifyOptions};
pub use extract::{extract, find_hover_target};
pub use price::ResolvedPrice;
pub use profiles::{profile, SiteProfile};

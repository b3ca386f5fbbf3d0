//! Typed client for the advisory backend.
//!
//! [`AdviceClient`] submits a sensed product for analysis and returns the
//! structured [`SalesAdvice`] payload; callers decide what to do when the
//! backend is slow or down (see the session orchestrator's fallback).

mod client;
mod error;
mod types;

pub use client::AdviceClient;
pub use error::AdviceError;
pub use types::{
    AdviceEnvelope, AdviceRequest, AliexpressAlternative, BestBrand, BuyingAdvice, Competitor,
    NewModelTiming, ProductOverview, SalesAdvice,
};

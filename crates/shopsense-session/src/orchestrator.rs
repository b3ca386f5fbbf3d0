//! Advisory orchestration.
//!
//! One advice request per hover: validate the record, check the quota gate,
//! call the backend, and fold the usage counter into the outcome. The
//! counter moves exactly once per confirmed success and never on fallback,
//! error, or quota paths.

use serde::Serialize;
use shopsense_advice::{AdviceClient, AdviceError, AdviceRequest, SalesAdvice};
use shopsense_core::{AppConfig, Language, ProductRecord, UsageSnapshot, UsageState};

use crate::quota;
use crate::store::PrefStore;

/// Why a fallback payload was served instead of a real analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Timeout,
    NetworkError,
    ServerError,
}

/// Outcome of one advice request, ready for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdviceOutcome {
    /// Real analysis from the backend; usage is the post-increment snapshot.
    Success {
        advice: SalesAdvice,
        usage: UsageSnapshot,
    },
    /// Locally synthesized payload; usage is the current, unincremented
    /// snapshot.
    Fallback {
        advice: SalesAdvice,
        usage: UsageSnapshot,
        reason: FallbackReason,
    },
    /// Free tier exhausted; no remote call was made.
    QuotaExceeded { usage: UsageSnapshot },
    /// The record failed pre-validation; no remote call was made.
    InvalidPrice { detail: String },
}

impl AdviceOutcome {
    /// Whether the overlay has advice to render (real or fallback).
    #[must_use]
    pub fn has_advice(&self) -> bool {
        matches!(
            self,
            AdviceOutcome::Success { .. } | AdviceOutcome::Fallback { .. }
        )
    }
}

/// Drives the advice flow for sensed products against one backend and one
/// preference store.
pub struct Orchestrator<S> {
    client: AdviceClient,
    store: S,
    language: Language,
}

impl<S: PrefStore> Orchestrator<S> {
    pub fn new(client: AdviceClient, store: S, language: Language) -> Self {
        Orchestrator {
            client,
            store,
            language,
        }
    }

    /// Builds an orchestrator from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError`] when the HTTP client cannot be constructed or
    /// the configured base URL is invalid.
    pub fn from_config(config: &AppConfig, store: S) -> Result<Self, AdviceError> {
        let client =
            AdviceClient::with_base_url(config.advice_timeout_secs, &config.advice_base_url)?;
        Ok(Self::new(
            client,
            store,
            config.language.unwrap_or(Language::En),
        ))
    }

    /// Runs one advice request end to end.
    ///
    /// Never returns an error: every failure path folds into an
    /// [`AdviceOutcome`] variant the overlay can render. An unreadable store
    /// fails open to the default usage state rather than blocking the user.
    pub async fn request_advice(&self, record: &ProductRecord) -> AdviceOutcome {
        if let Err(reason) = record.validate() {
            tracing::debug!(%reason, "record rejected before quota check");
            return AdviceOutcome::InvalidPrice {
                detail: reason.to_string(),
            };
        }

        let mut state = match self.store.load().await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(%err, "usage store unreadable, failing open");
                UsageState::default()
            }
        };

        if !quota::admit(&state) {
            tracing::debug!(used = state.used, limit = state.free_limit, "quota exhausted");
            return AdviceOutcome::QuotaExceeded {
                usage: state.snapshot(),
            };
        }

        let request = AdviceRequest {
            product_data: record.clone(),
            language: self.language,
            currency: record.currency,
        };

        match self.client.analyze(&request).await {
            Ok(advice) => {
                if !state.has_paid {
                    state.used += 1;
                    if let Err(err) = self.store.save_used(state.used).await {
                        // The analysis already happened; report the spent use
                        // even though it did not persist.
                        tracing::warn!(%err, used = state.used, "failed to persist usage counter");
                    }
                }
                AdviceOutcome::Success {
                    advice,
                    usage: state.snapshot(),
                }
            }
            Err(err) => {
                let reason = match &err {
                    AdviceError::Timeout => FallbackReason::Timeout,
                    AdviceError::Http(_) => FallbackReason::NetworkError,
                    AdviceError::Api(_) | AdviceError::Deserialize { .. } => {
                        FallbackReason::ServerError
                    }
                };
                tracing::warn!(%err, ?reason, "advice call failed, serving fallback");
                AdviceOutcome::Fallback {
                    advice: SalesAdvice::unavailable(),
                    usage: state.snapshot(),
                    reason,
                }
            }
        }
    }
}

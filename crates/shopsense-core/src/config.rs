use thiserror::Error;

use crate::product::Language;
use crate::usage::DEFAULT_FREE_LIMIT;

const DEFAULT_ADVICE_URL: &str = "https://shopsense-advice-api.onrender.com";

/// Runtime configuration threaded into the classifier and orchestrator
/// instead of ambient module-level state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the advice provider.
    pub advice_base_url: String,
    /// Bound on the remote advice call.
    pub advice_timeout_secs: u64,
    /// Free analyses before the quota gate rejects.
    pub free_limit: u32,
    /// When false, only the named storefront families are classified; the
    /// heuristic product-page detector is skipped.
    pub support_all_sites: bool,
    /// Explicit language override. `None` means detect from the host locale.
    pub language: Option<Language>,
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading.
///
/// # Errors
///
/// Returns [`ConfigError`] if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from environment variables already in the process,
/// without touching `.env` files.
///
/// # Errors
///
/// Returns [`ConfigError`] if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// The lookup is injected so the parsing logic can be tested against a plain
/// `HashMap`, without touching `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        or_default(var, default)
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let advice_base_url = or_default("SHOPSENSE_ADVICE_URL", DEFAULT_ADVICE_URL);
    let advice_timeout_secs = parse_u64("SHOPSENSE_ADVICE_TIMEOUT_SECS", "30")?;
    let free_limit = parse_u32("SHOPSENSE_FREE_LIMIT", &DEFAULT_FREE_LIMIT.to_string())?;
    let support_all_sites = parse_bool("SHOPSENSE_SUPPORT_ALL_SITES", "true")?;
    let log_level = or_default("SHOPSENSE_LOG_LEVEL", "info");

    let language = match lookup("SHOPSENSE_LANGUAGE") {
        Ok(raw) => Some(
            raw.parse::<Language>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "SHOPSENSE_LANGUAGE".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        Err(_) => None,
    };

    Ok(AppConfig {
        advice_base_url,
        advice_timeout_secs,
        free_limit,
        support_all_sites,
        language,
        log_level,
    })
}

//! Domain types and configuration shared across the shopsense workspace.

mod config;
mod product;
mod usage;

pub use config::{load_app_config, load_app_config_from_env, AppConfig, ConfigError};
pub use product::{Currency, Language, ProductRecord, RecordError, SiteId, MAX_FEATURES};
pub use usage::{UsageSnapshot, UsageState, DEFAULT_FREE_LIMIT};

//! Command line interface for the product sensing and advisory pipeline.
//!
//! Operates on saved HTML snapshots, so every stage of the pipeline can be
//! exercised offline: `classify` alone, `extract` for the sensed record, and
//! `advise` for the full flow against the configured backend.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shopsense_core::{AppConfig, Language, ProductRecord, UsageState};
use shopsense_dom::{DomQuery, HtmlView};
use shopsense_extract::{classify, extract, find_hover_target, ClassifyOptions};
use shopsense_session::{MemoryPrefStore, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "shopsense-cli")]
#[command(about = "Product sensing and shopping advice over page snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decide which storefront profile applies to a page snapshot.
    Classify {
        /// URL the snapshot was taken from.
        #[arg(long)]
        url: String,
        /// Path to the HTML snapshot.
        #[arg(long)]
        html: PathBuf,
    },
    /// Extract a product record from a page snapshot.
    Extract {
        #[arg(long)]
        url: String,
        #[arg(long)]
        html: PathBuf,
        /// CSS selector of the hovered element, for listing-card scoping.
        #[arg(long)]
        anchor: Option<String>,
    },
    /// Extract a product and run the advice flow against the backend.
    Advise {
        #[arg(long)]
        url: String,
        #[arg(long)]
        html: PathBuf,
        #[arg(long)]
        anchor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = shopsense_core::load_app_config()?;
    if config.language.is_none() {
        config.language = Some(locale_language(
            std::env::var("LC_ALL").ok(),
            std::env::var("LANG").ok(),
        ));
    }
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Classify { url, html } => {
            let dom = load_snapshot(&html)?;
            let options = ClassifyOptions {
                support_all_sites: config.support_all_sites,
            };
            match classify(&url, &dom, &options) {
                Some(site) => println!("{site}"),
                None => println!("none"),
            }
        }
        Commands::Extract { url, html, anchor } => {
            let dom = load_snapshot(&html)?;
            let record = sense(&config, &dom, &url, anchor.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Advise { url, html, anchor } => {
            let dom = load_snapshot(&html)?;
            let record = sense(&config, &dom, &url, anchor.as_deref())?;

            let store = MemoryPrefStore::new(UsageState {
                used: 0,
                free_limit: config.free_limit,
                has_paid: false,
            });
            let orchestrator = Orchestrator::from_config(&config, store)?;
            let outcome = orchestrator.request_advice(&record).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> anyhow::Result<HtmlView> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    Ok(HtmlView::parse(&html))
}

fn sense(
    config: &AppConfig,
    dom: &HtmlView,
    url: &str,
    anchor: Option<&str>,
) -> anyhow::Result<ProductRecord> {
    let options = ClassifyOptions {
        support_all_sites: config.support_all_sites,
    };
    let site = classify(url, dom, &options).context("page did not classify as a product page")?;
    tracing::debug!(%site, url, "classified page");

    // Without an explicit anchor, hover the first buy control or listing
    // card the site's button chain finds.
    let anchor_node = match anchor {
        Some(selector) => dom.query(None, selector),
        None => find_hover_target(dom, site),
    };
    extract(dom, url, site, anchor_node).context("no valid product could be extracted")
}

/// Language for advice requests when no explicit override is configured:
/// `LC_ALL` beats `LANG`, and anything unrecognized falls back to English.
fn locale_language(lc_all: Option<String>, lang: Option<String>) -> Language {
    Language::from_locale(&lc_all.or(lang).unwrap_or_default())
}

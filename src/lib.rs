pub mod cli;
pub mod core;
pub mod notifier;
pub mod providers;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::{AppConfig, DEFAULT_EXCHANGE_RATE_URL};
use crate::core::currency::{RateTable, RateTableCache, RateTableProvider};
use crate::providers::{ExchangeRateApiProvider, FallbackRateProvider, StaticRateProvider};
use crate::store::DiskRateCache;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Summary,
    Insights,
    List,
    Upcoming { limit: usize },
    Digest { dry_run: bool },
    Trials,
}

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Evaluate dates as of this instant instead of the system clock.
    pub now: Option<DateTime<Utc>>,
    /// Skip the live rate fetch and use the configured fallback table.
    pub offline: bool,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    options: &RunOptions,
) -> Result<()> {
    info!("Subscription tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let now = options.now.unwrap_or_else(Utc::now);
    let today = now.date_naive();
    let subs = &config.subscriptions;
    let base = &config.currency;

    match command {
        AppCommand::Summary => {
            let rates = load_rates(&config, options.offline).await?;
            cli::summary::run(subs, &rates, base, &config.safe_categories, today)
        }
        AppCommand::Insights => {
            let rates = load_rates(&config, options.offline).await?;
            cli::insights::run(subs, &rates, base, &config.safe_categories)
        }
        AppCommand::List => {
            let rates = load_rates(&config, options.offline).await?;
            cli::list::run(subs, &rates, base)
        }
        AppCommand::Upcoming { limit } => {
            let rates = load_rates(&config, options.offline).await?;
            cli::upcoming::run(subs, &rates, base, today, limit)
        }
        AppCommand::Digest { dry_run } => cli::digest::run(&config, now, dry_run).await,
        AppCommand::Trials => cli::digest::run_trials(&config, now),
    }
}

/// Rate table for the configured base currency.
///
/// Live tables are cached on disk under the data directory for
/// `cache_minutes`. Offline runs and failed fetches use the fallback table.
pub async fn load_rates(config: &AppConfig, offline: bool) -> Result<RateTable> {
    if offline {
        return StaticRateProvider::new(config.fallback_rates.clone())
            .fetch_rates(&config.currency)
            .await;
    }

    let (base_url, cache_minutes) = config
        .providers
        .exchange_rate
        .as_ref()
        .map_or((DEFAULT_EXCHANGE_RATE_URL, 60), |p| {
            (p.base_url.as_str(), p.cache_minutes)
        });
    let ttl = Duration::from_secs(cache_minutes * 60);
    let rate_cache: Arc<dyn RateTableCache> = match config
        .default_data_path()
        .and_then(|dir| DiskRateCache::open(&dir.join("rates"), ttl))
    {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("Rate cache unavailable, keeping rates in memory: {e:#}");
            Arc::new(Cache::<String, RateTable>::with_ttl(ttl))
        }
    };
    let provider = FallbackRateProvider::new(
        ExchangeRateApiProvider::new(base_url, rate_cache),
        config.fallback_rates.clone(),
    );

    let spinner = cli::ui::new_spinner("Fetching exchange rates...");
    let rates = provider.fetch_rates(&config.currency).await;
    spinner.finish_and_clear();
    rates
}

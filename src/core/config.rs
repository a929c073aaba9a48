use crate::core::analytics::SAFE_CATEGORIES;
use crate::core::currency::{RateTable, SUPPORTED_CURRENCIES};
use crate::core::notify::{DEFAULT_ALERT_WINDOW_DAYS, DEFAULT_TRIAL_WINDOW_DAYS};
use crate::core::subscription::Subscription;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://api.exchangerate-api.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    /// Minutes a fetched table is reused before asking the provider again.
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u64,
}

fn default_cache_minutes() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: Some(ExchangeRateProviderConfig {
                base_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
                cache_minutes: default_cache_minutes(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_alert_window_days")]
    pub alert_window_days: u64,
    #[serde(default = "default_trial_window_days")]
    pub trial_window_days: u64,
    /// Upper bound on reminders sent by a single digest run.
    #[serde(default = "default_max_per_run")]
    pub max_per_run: usize,
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_alert_window_days() -> u64 {
    DEFAULT_ALERT_WINDOW_DAYS
}

fn default_trial_window_days() -> u64 {
    DEFAULT_TRIAL_WINDOW_DAYS
}

fn default_max_per_run() -> usize {
    20
}

fn default_user_name() -> String {
    "User".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            alert_window_days: default_alert_window_days(),
            trial_window_days: default_trial_window_days(),
            max_per_run: default_max_per_run(),
            user_name: default_user_name(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_safe_categories() -> Vec<String> {
    SAFE_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Base currency all figures are reported in.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_safe_categories")]
    pub safe_categories: Vec<String>,
    /// Rates used when the live provider is unavailable.
    #[serde(default = "RateTable::fallback")]
    pub fallback_rates: RateTable,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "subtally", "subtally")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "subtally", "subtally")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!(
            "Successfully loaded config with {} subscriptions",
            config.subscriptions.len()
        );
        Ok(config)
    }

    /// The base currency must be one the application reports in.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_CURRENCIES.contains(&self.currency.as_str()) {
            anyhow::bail!(
                "Unsupported base currency: {} (expected one of {})",
                self.currency,
                SUPPORTED_CURRENCIES.join(", ")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frequency::Frequency;
    use crate::core::subscription::Status;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
subscriptions:
  - id: "netflix"
    vendor: "Netflix"
    cost: 15.49
    currency: "USD"
    frequency: "MONTHLY"
    category: "Streaming"
    next_renewal_date: "2026-11-02"
  - id: "icloud"
    vendor: "iCloud+"
    cost: 2390.0
    split_cost: 600.0
    currency: "PHP"
    frequency: "YEARLY"
    category: "Cloud"
    status: "PAUSED"
    next_renewal_date: "2027-03-10"
currency: "EUR"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.subscriptions.len(), 2);
        assert_eq!(config.subscriptions[0].vendor, "Netflix");
        assert_eq!(config.subscriptions[1].frequency, Frequency::Yearly);
        assert_eq!(config.subscriptions[1].status, Status::Paused);
        assert_eq!(config.currency, "EUR");

        // Defaults
        assert_eq!(config.notifications.alert_window_days, 3);
        assert_eq!(config.notifications.trial_window_days, 2);
        assert_eq!(config.notifications.max_per_run, 20);
        assert_eq!(config.safe_categories.len(), 5);
        assert!(config.safe_categories.contains(&"Utilities".to_string()));
        assert_eq!(config.fallback_rates, RateTable::fallback());
        assert_eq!(
            config.providers.exchange_rate.unwrap().base_url,
            DEFAULT_EXCHANGE_RATE_URL
        );
    }

    #[test]
    fn test_config_overrides() {
        let yaml_str = r#"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
notifications:
  alert_window_days: 7
  max_per_run: 5
safe_categories: ["Family"]
fallback_rates:
  USD: 1.0
  EUR: 0.5
data_path: "/tmp/subtally"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert!(config.subscriptions.is_empty());
        assert_eq!(config.currency, "USD");
        let provider = config.providers.exchange_rate.as_ref().unwrap();
        assert_eq!(provider.base_url, "http://example.com/rates");
        assert_eq!(provider.cache_minutes, 60);
        assert_eq!(config.notifications.alert_window_days, 7);
        assert_eq!(config.notifications.trial_window_days, 2);
        assert_eq!(config.notifications.max_per_run, 5);
        assert_eq!(config.safe_categories, vec!["Family".to_string()]);
        assert_eq!(config.fallback_rates.get("EUR"), Some(0.5));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/subtally")
        );
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_unsupported_base_currency_is_rejected() {
        let config: AppConfig =
            serde_yaml::from_str("currency: \"CHF\"\n").expect("Failed to deserialize");
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("Unsupported base currency: CHF"), "{message}");

        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "currency: \"CHF\"\n").unwrap();
        assert!(AppConfig::load_from_path(file.path()).is_err());

        fs::write(file.path(), "currency: \"PHP\"\n").unwrap();
        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.currency, "PHP");
    }
}

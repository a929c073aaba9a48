use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::currency::{RateTable, RateTableProvider};

/// Serves a fixed rate table, used for offline runs.
pub struct StaticRateProvider {
    rates: RateTable,
}

impl StaticRateProvider {
    pub fn new(rates: RateTable) -> Self {
        StaticRateProvider { rates }
    }
}

#[async_trait]
impl RateTableProvider for StaticRateProvider {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        debug!("Using static rates for {base}");
        Ok(self.rates.clone())
    }
}

/// Wraps a live provider and degrades to a static table when it fails.
///
/// Rate tables are only ever used for ratios, so a fallback anchored at a
/// different reference currency than `base` still converts correctly.
pub struct FallbackRateProvider<T: RateTableProvider> {
    inner: T,
    fallback: RateTable,
}

impl<T: RateTableProvider> FallbackRateProvider<T> {
    pub fn new(inner: T, fallback: RateTable) -> Self {
        Self { inner, fallback }
    }
}

#[async_trait]
impl<T: RateTableProvider> RateTableProvider for FallbackRateProvider<T> {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        match self.inner.fetch_rates(base).await {
            Ok(rates) => Ok(rates),
            Err(e) => {
                warn!(error = %e, "Exchange rate fetch failed, using fallback rates");
                Ok(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRateProvider {
        result: Result<RateTable, String>,
        call_count: AtomicUsize,
    }

    impl MockRateProvider {
        fn new(result: Result<RateTable, String>) -> Self {
            Self {
                result,
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateTableProvider for MockRateProvider {
        async fn fetch_rates(&self, _base: &str) -> Result<RateTable> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(|e| anyhow!(e))
        }
    }

    #[tokio::test]
    async fn test_live_rates_pass_through() {
        let live: RateTable = [("USD", 1.0), ("EUR", 0.5)].into_iter().collect();
        let provider = FallbackRateProvider::new(
            MockRateProvider::new(Ok(live.clone())),
            RateTable::fallback(),
        );
        assert_eq!(provider.fetch_rates("USD").await.unwrap(), live);
        assert_eq!(provider.inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_failure_uses_fallback() {
        let provider = FallbackRateProvider::new(
            MockRateProvider::new(Err("API unavailable".to_string())),
            RateTable::fallback(),
        );
        let rates = provider.fetch_rates("USD").await.unwrap();
        assert_eq!(rates, RateTable::fallback());
        assert_eq!(rates.get("PHP"), Some(58.5));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticRateProvider::new(RateTable::fallback());
        let rates = provider.fetch_rates("EUR").await.unwrap();
        assert_eq!(rates.get("JPY"), Some(155.0));
    }
}

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::currency::{RateTable, RateTableCache, RateTableProvider};

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

/// Fetches the latest rates for a base currency from an
/// exchangerate-api.com compatible endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    cache: Arc<dyn RateTableCache>,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, cache: Arc<dyn RateTableCache>) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateTableProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        if let Some(cached) = self.cache.get(base).await {
            return Ok(cached);
        }

        let url = format!("{}/v4/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder().user_agent("subtally/1.0").build()?;
        let client = &client;
        let request_url = url.as_str();
        let response = with_retry(
            || async move { client.get(request_url).send().await?.error_for_status() },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rates response for {}: {}", base, e))?;

        if data.rates.is_empty() {
            return Err(anyhow!("No rate data found for base currency: {}", base));
        }

        let rates = RateTable::from(data.rates);
        debug!("Fetched {} rates for {}", rates.len(), base);
        self.cache.put(base, rates.clone()).await;
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::Cache;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn memory_cache() -> Arc<dyn RateTableCache> {
        Arc::new(Cache::<String, RateTable>::new())
    }

    async fn create_mock_server(base: &str, template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v4/latest/{base}")))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "USD",
            "date": "2026-10-16",
            "rates": { "USD": 1, "EUR": 0.91, "PHP": 57.8 }
        }"#;
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), memory_cache());
        let rates = provider.fetch_rates("USD").await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get("EUR"), Some(0.91));
        assert_eq!(rates.rate_of("USD"), 1.0);
    }

    #[tokio::test]
    async fn test_rates_are_cached_per_base() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/EUR"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"rates": {"EUR": 1, "USD": 1.1}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), memory_cache());
        let first = provider.fetch_rates("EUR").await.unwrap();
        let second = provider.fetch_rates("EUR").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_rates_is_an_error() {
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(r#"{"rates": {}}"#),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), memory_cache());
        let result = provider.fetch_rates("USD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for base currency: USD"
        );
    }

    #[tokio::test]
    async fn test_server_error_is_reported_after_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1 + RETRIES as u64)
            .mount(&mock_server)
            .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), memory_cache());
        let result = provider.fetch_rates("USD").await;
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("Request error:"), "{message}");
        assert!(message.contains("500"), "{message}");
        assert!(message.ends_with("for base currency: USD"), "{message}");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(r#"{"result": "error"}"#),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri(), memory_cache());
        let result = provider.fetch_rates("USD").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rates response for USD")
        );
    }
}

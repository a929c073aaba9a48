//! Currency conversion and display.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Currencies the application offers in its settings.
pub const SUPPORTED_CURRENCIES: [&str; 7] = ["USD", "PHP", "EUR", "GBP", "AUD", "CAD", "JPY"];

/// Multipliers for each currency relative to a single reference currency.
///
/// The reference currency has a multiplier of exactly 1. Looking up a code
/// that is not in the table yields 1, so unknown currencies convert as if
/// they were the reference currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(HashMap<String, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Static USD-anchored rates used when no live table can be fetched.
    pub fn fallback() -> Self {
        [
            ("USD", 1.0),
            ("PHP", 58.5),
            ("EUR", 0.93),
            ("GBP", 0.79),
            ("AUD", 1.52),
            ("CAD", 1.36),
            ("JPY", 155.0),
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, code: &str, rate: f64) {
        self.0.insert(code.to_string(), rate);
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Multiplier for `code`; missing, zero or non-finite rates count as 1.
    pub fn rate_of(&self, code: &str) -> f64 {
        match self.0.get(code) {
            Some(rate) if rate.is_finite() && *rate != 0.0 => *rate,
            _ => 1.0,
        }
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        convert(amount, from, to, self)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<HashMap<String, f64>> for RateTable {
    fn from(rates: HashMap<String, f64>) -> Self {
        Self(rates)
    }
}

/// Converts `amount` between two currencies through the table's reference
/// currency. Identical codes return `amount` untouched.
pub fn convert(amount: f64, from: &str, to: &str, rates: &RateTable) -> f64 {
    if from == to {
        return amount;
    }
    (amount / rates.rate_of(from)) * rates.rate_of(to)
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "PHP" => Some("₱"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "AUD" => Some("A$"),
        "CAD" => Some("CA$"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats an amount for display, e.g. `$1,234.50` or `CHF 12.00`.
///
/// Always renders two fraction digits.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let prefix = currency_symbol(currency)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{currency} "));

    if !amount.is_finite() {
        return format!("{prefix}{amount}");
    }

    let rounded = format!("{:.2}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if amount < 0.0 && rounded != "0.00" {
        "-"
    } else {
        ""
    };

    format!("{sign}{prefix}{}.{fraction}", group_thousands(whole))
}

/// Supplies a rate table anchored at `base`.
#[async_trait]
pub trait RateTableProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable>;
}

/// Holds fetched rate tables, keyed by base currency, until they expire.
#[async_trait]
pub trait RateTableCache: Send + Sync {
    async fn get(&self, base: &str) -> Option<RateTable>;
    async fn put(&self, base: &str, rates: RateTable);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_same_currency_is_identity() {
        let rates = RateTable::fallback();
        assert_eq!(convert(12.34, "EUR", "EUR", &rates), 12.34);
        assert_eq!(convert(12.34, "XYZ", "XYZ", &RateTable::new()), 12.34);
    }

    #[test]
    fn test_convert_through_reference_currency() {
        let rates = RateTable::fallback();
        assert_eq!(convert(58.5, "PHP", "USD", &rates), 1.0);
        let eur_to_gbp = convert(93.0, "EUR", "GBP", &rates);
        assert!((eur_to_gbp - 79.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_round_trip() {
        let rates = RateTable::fallback();
        for (a, b) in [("USD", "JPY"), ("PHP", "EUR"), ("AUD", "CAD")] {
            let there = convert(250.0, a, b, &rates);
            let back = convert(there, b, a, &rates);
            assert!((back - 250.0).abs() < 1e-9, "{a}->{b} drifted to {back}");
        }
    }

    #[test]
    fn test_convert_unknown_currency_uses_unit_rate() {
        let rates = RateTable::fallback();
        // XYZ behaves like a currency with multiplier 1.
        assert_eq!(convert(10.0, "XYZ", "PHP", &rates), 585.0);
        assert_eq!(convert(10.0, "XYZ", "USD", &rates), 10.0);
        assert_eq!(convert(10.0, "USD", "XYZ", &RateTable::new()), 10.0);
    }

    #[test]
    fn test_zero_rate_is_treated_as_missing() {
        let mut rates = RateTable::new();
        rates.insert("EUR", 0.0);
        assert_eq!(rates.rate_of("EUR"), 1.0);
        assert_eq!(convert(10.0, "EUR", "USD", &rates), 10.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, "USD"), "$1,234.50");
        assert_eq!(format_amount(0.0, "EUR"), "€0.00");
        assert_eq!(format_amount(1_000_000.0, "PHP"), "₱1,000,000.00");
        assert_eq!(format_amount(-3.0, "GBP"), "-£3.00");
        assert_eq!(format_amount(999.999, "USD"), "$1,000.00");
        assert_eq!(format_amount(155.0, "JPY"), "¥155.00");
        assert_eq!(format_amount(12.0, "CHF"), "CHF 12.00");
        assert_eq!(format_amount(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn test_rate_table_deserializes_from_map() {
        let yaml_str = "USD: 1.0\nEUR: 0.9\n";
        let rates: RateTable = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.get("EUR"), Some(0.9));
    }
}

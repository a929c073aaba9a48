//! Billing periodicity and monthly normalization.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// How often a subscription bills.
///
/// Only monthly and yearly periods are modelled. Any other value read from
/// storage is kept verbatim in `Unsupported` so each consumer has to decide
/// what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Monthly,
    Yearly,
    Unsupported(String),
}

impl From<String> for Frequency {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MONTHLY" => Frequency::Monthly,
            "YEARLY" => Frequency::Yearly,
            _ => Frequency::Unsupported(s),
        }
    }
}

impl From<&str> for Frequency {
    fn from(s: &str) -> Self {
        Frequency::from(s.to_string())
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Monthly => "MONTHLY".to_string(),
            Frequency::Yearly => "YEARLY".to_string(),
            Frequency::Unsupported(s) => s,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "Monthly"),
            Frequency::Yearly => write!(f, "Yearly"),
            Frequency::Unsupported(s) => write!(f, "{s} (unsupported)"),
        }
    }
}

impl Frequency {
    /// Next billing date after `date`, or `None` when the period is unknown.
    ///
    /// Month arithmetic clamps to the last day of the target month, so
    /// Jan 31 advances to Feb 28 (or 29) and a leap day advances a year to
    /// Feb 28.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Yearly => date.checked_add_months(Months::new(12)),
            Frequency::Unsupported(_) => None,
        }
    }
}

/// Converts a periodic amount into its monthly equivalent.
///
/// Callers convert currency first and normalize frequency second.
/// Unsupported periods are counted as monthly.
pub fn monthly_equivalent(amount: f64, frequency: &Frequency) -> f64 {
    match frequency {
        Frequency::Yearly => amount / 12.0,
        Frequency::Monthly | Frequency::Unsupported(_) => amount,
    }
}

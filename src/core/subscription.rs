//! Subscription records as read from configuration or storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::frequency::Frequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Status::Active => "Active",
                Status::Paused => "Paused",
                Status::Cancelled => "Cancelled",
            }
        )
    }
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

/// A recurring vendor charge registered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub vendor: String,
    pub cost: f64,
    /// The user's share of a shared plan. Only meaningful when positive.
    #[serde(default)]
    pub split_cost: Option<f64>,
    pub currency: String,
    pub frequency: Frequency,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub next_renewal_date: NaiveDate,
    #[serde(default)]
    pub last_notified_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

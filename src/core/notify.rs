//! Selects subscriptions that need a renewal or trial-ending reminder.
//!
//! Selection is side-effect free. The caller sends the messages and records
//! `last_notified_at` only for the ones that were delivered.

use crate::core::currency::format_amount;
use crate::core::subscription::Subscription;
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::fmt::Display;

pub const DEFAULT_ALERT_WINDOW_DAYS: u64 = 3;
pub const DEFAULT_TRIAL_WINDOW_DAYS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    TrialEnding { days_left: i64 },
    Renewal,
}

impl Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::TrialEnding { .. } => write!(f, "Trial ending"),
            AlertKind::Renewal => write!(f, "Renewal"),
        }
    }
}

/// A reminder for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub subscription_id: String,
    pub vendor: String,
    pub renewal_date: NaiveDate,
    pub amount: f64,
    pub currency: String,
}

impl Alert {
    fn for_subscription(sub: &Subscription, today: NaiveDate) -> Self {
        let kind = if sub.is_trial {
            AlertKind::TrialEnding {
                days_left: (sub.next_renewal_date - today).num_days().max(0),
            }
        } else {
            AlertKind::Renewal
        };
        Alert {
            kind,
            subscription_id: sub.id.clone(),
            vendor: sub.vendor.clone(),
            renewal_date: sub.next_renewal_date,
            amount: sub.cost,
            currency: sub.currency.clone(),
        }
    }

    pub fn subject(&self) -> String {
        match self.kind {
            AlertKind::TrialEnding { .. } => format!("Trial ending soon for {}", self.vendor),
            AlertKind::Renewal => format!("Upcoming renewal for {}", self.vendor),
        }
    }

    pub fn body(&self, user_name: &str) -> String {
        let amount = format_amount(self.amount, &self.currency);
        let date = self.renewal_date.format("%b %-d, %Y");
        match self.kind {
            AlertKind::TrialEnding { days_left } => {
                let days = if days_left == 1 { "day" } else { "days" };
                format!(
                    "Hi {user_name},\n\nYour {} trial ends in {days_left} {days}. \
                     Unless you cancel, it converts to a paid plan at {amount} on {date}.",
                    self.vendor
                )
            }
            AlertKind::Renewal => format!(
                "Hi {user_name},\n\n{} renews on {date} for {amount}. \
                 If you want to keep this subscription, no action is needed.",
                self.vendor
            ),
        }
    }
}

/// Alerts in the order their subscriptions were supplied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DueNotifications {
    pub alerts: Vec<Alert>,
}

impl DueNotifications {
    pub fn trial_ending(&self) -> impl Iterator<Item = &Alert> {
        self.alerts
            .iter()
            .filter(|a| matches!(a.kind, AlertKind::TrialEnding { .. }))
    }

    pub fn renewals(&self) -> impl Iterator<Item = &Alert> {
        self.alerts
            .iter()
            .filter(|a| a.kind == AlertKind::Renewal)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

fn renews_within(sub: &Subscription, today: NaiveDate, window_days: u64) -> bool {
    let end = today
        .checked_add_days(Days::new(window_days))
        .unwrap_or(NaiveDate::MAX);
    sub.next_renewal_date >= today && sub.next_renewal_date <= end
}

/// Active subscriptions renewing within `alert_window_days` of `now` that
/// have not been notified since the start of `now`'s day (UTC).
pub fn select_due(
    subs: &[Subscription],
    now: DateTime<Utc>,
    alert_window_days: u64,
) -> DueNotifications {
    let today = now.date_naive();
    let start_of_today = start_of_day(now);

    let alerts = subs
        .iter()
        .filter(|sub| sub.is_active())
        .filter(|sub| renews_within(sub, today, alert_window_days))
        .filter(|sub| {
            sub.last_notified_at
                .is_none_or(|notified| notified < start_of_today)
        })
        .map(|sub| Alert::for_subscription(sub, today))
        .collect();

    DueNotifications { alerts }
}

/// Active trials converting within `window_days`, whether or not they were
/// already reminded.
pub fn select_expiring_trials(
    subs: &[Subscription],
    now: DateTime<Utc>,
    window_days: u64,
) -> Vec<Alert> {
    let today = now.date_naive();
    subs.iter()
        .filter(|sub| sub.is_active() && sub.is_trial)
        .filter(|sub| renews_within(sub, today, window_days))
        .map(|sub| Alert::for_subscription(sub, today))
        .collect()
}

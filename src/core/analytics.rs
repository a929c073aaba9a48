//! Provides the spending metrics derived from a user's subscriptions.
//!
//! Every function here is a pure calculation over the subscriptions, a rate
//! table and the base currency the figures are reported in.
use crate::core::currency::{RateTable, convert};
use crate::core::frequency::{Frequency, monthly_equivalent};
use crate::core::runway::{RunwayProjection, compute_runway};
use crate::core::subscription::{Status, Subscription};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Categories too generic to signal duplicate spend.
pub const SAFE_CATEGORIES: [&str; 5] = ["Personal", "Work", "Uncategorized", "General", "Utilities"];

/// Decides which subscriptions a metric counts and which amount it charges.
pub trait CostPolicy {
    fn includes(&self, sub: &Subscription) -> bool;
    fn cost_of(&self, sub: &Subscription) -> f64;
}

/// Real money leaving the account: active, non-trial, user's share of the cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnPolicy;

impl CostPolicy for BurnPolicy {
    fn includes(&self, sub: &Subscription) -> bool {
        sub.is_active() && !sub.is_trial
    }

    fn cost_of(&self, sub: &Subscription) -> f64 {
        effective_cost(sub)
    }
}

/// Pending renewals: every active subscription, trials included, at full cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunwayPolicy;

impl CostPolicy for RunwayPolicy {
    fn includes(&self, sub: &Subscription) -> bool {
        sub.is_active()
    }

    fn cost_of(&self, sub: &Subscription) -> f64 {
        sub.cost
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedundancyGroup {
    pub category: String,
    pub count: usize,
    pub vendors: Vec<String>,
    pub total_monthly_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GraveyardStats {
    pub count: usize,
    pub total_saved_monthly: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub category: String,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingRenewal {
    pub id: String,
    pub vendor: String,
    pub next_renewal_date: NaiveDate,
    pub days_left: i64,
    pub cost: f64,
    pub currency: String,
}

/// All headline figures for one user, in `base_currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub base_currency: String,
    pub monthly_burn: f64,
    pub annual_projection: f64,
    pub active_trials: usize,
    pub graveyard: GraveyardStats,
    pub redundancies: Vec<RedundancyGroup>,
    pub runway: RunwayProjection,
}

/// The amount attributable to the user: a positive split cost wins over the
/// full cost.
pub fn effective_cost(sub: &Subscription) -> f64 {
    match sub.split_cost {
        Some(split) if split > 0.0 => split,
        _ => sub.cost,
    }
}

/// Monthly-equivalent of the user's share, converted into `base_currency`.
pub fn monthly_cost_in_base(sub: &Subscription, rates: &RateTable, base_currency: &str) -> f64 {
    if let Frequency::Unsupported(raw) = &sub.frequency {
        debug!(
            "Treating unsupported frequency {raw} of {} as monthly",
            sub.vendor
        );
    }
    let converted = convert(effective_cost(sub), &sub.currency, base_currency, rates);
    monthly_equivalent(converted, &sub.frequency)
}

pub fn compute_monthly_burn(subs: &[Subscription], rates: &RateTable, base_currency: &str) -> f64 {
    let policy = BurnPolicy;
    let burn = subs
        .iter()
        .filter(|sub| policy.includes(sub))
        .map(|sub| {
            let converted = convert(policy.cost_of(sub), &sub.currency, base_currency, rates);
            monthly_equivalent(converted, &sub.frequency)
        })
        .sum();
    debug!("Monthly burn in {base_currency}: {burn}");
    burn
}

/// Always derived from the monthly burn so the two figures cannot drift.
pub fn compute_annual_projection(monthly_burn: f64) -> f64 {
    monthly_burn * 12.0
}

pub fn count_active_trials(subs: &[Subscription]) -> usize {
    subs.iter().filter(|sub| sub.is_active() && sub.is_trial).count()
}

/// Monthly cost no longer at risk from cancelled subscriptions, trials included.
pub fn compute_graveyard_stats(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
) -> GraveyardStats {
    subs.iter()
        .filter(|sub| sub.status == Status::Cancelled)
        .fold(GraveyardStats::default(), |mut stats, sub| {
            stats.count += 1;
            stats.total_saved_monthly += monthly_cost_in_base(sub, rates, base_currency);
            stats
        })
}

/// Groups active subscriptions by exact category and reports categories that
/// hold more than one of them.
///
/// Trial members are counted and listed but add nothing to
/// `total_monthly_cost`. Groups come back in the order their category was
/// first seen.
pub fn compute_redundancy_insights<S: AsRef<str>>(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    safe_categories: &[S],
) -> Vec<RedundancyGroup> {
    let mut groups: Vec<RedundancyGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sub in subs.iter().filter(|sub| sub.is_active()) {
        let position = *index.entry(sub.category.as_str()).or_insert_with(|| {
            groups.push(RedundancyGroup {
                category: sub.category.clone(),
                count: 0,
                vendors: Vec::new(),
                total_monthly_cost: 0.0,
            });
            groups.len() - 1
        });

        let group = &mut groups[position];
        group.count += 1;
        group.vendors.push(sub.vendor.clone());
        if !sub.is_trial {
            group.total_monthly_cost += monthly_cost_in_base(sub, rates, base_currency);
        }
    }

    groups
        .into_iter()
        .filter(|group| group.count > 1)
        .filter(|group| {
            !safe_categories
                .iter()
                .any(|safe| safe.as_ref() == group.category)
        })
        .collect()
}

/// Active non-trial monthly spend per category, largest first.
pub fn compute_category_breakdown(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
) -> Vec<CategorySpend> {
    let policy = BurnPolicy;
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for sub in subs.iter().filter(|sub| policy.includes(sub)) {
        *totals.entry(sub.category.as_str()).or_insert(0.0) +=
            monthly_cost_in_base(sub, rates, base_currency);
    }

    let mut breakdown: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, monthly_cost)| CategorySpend {
            category: category.to_string(),
            monthly_cost,
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.monthly_cost
            .total_cmp(&a.monthly_cost)
            .then_with(|| a.category.cmp(&b.category))
    });
    breakdown
}

/// Active subscriptions due today or later, closest first. Amounts are the
/// user's share of one charge, converted into `base_currency`.
pub fn upcoming_renewals(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingRenewal> {
    let mut upcoming: Vec<UpcomingRenewal> = subs
        .iter()
        .filter(|sub| sub.is_active())
        .map(|sub| UpcomingRenewal {
            id: sub.id.clone(),
            vendor: sub.vendor.clone(),
            next_renewal_date: sub.next_renewal_date,
            days_left: (sub.next_renewal_date - today).num_days(),
            cost: convert(effective_cost(sub), &sub.currency, base_currency, rates),
            currency: base_currency.to_string(),
        })
        .filter(|renewal| renewal.days_left >= 0)
        .collect();

    upcoming.sort_by(|a, b| {
        a.days_left
            .cmp(&b.days_left)
            .then_with(|| a.vendor.cmp(&b.vendor))
    });
    upcoming.truncate(limit);
    upcoming
}

pub fn compute_dashboard<S: AsRef<str>>(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    safe_categories: &[S],
    today: NaiveDate,
) -> Dashboard {
    let monthly_burn = compute_monthly_burn(subs, rates, base_currency);
    Dashboard {
        base_currency: base_currency.to_string(),
        monthly_burn,
        annual_projection: compute_annual_projection(monthly_burn),
        active_trials: count_active_trials(subs),
        graveyard: compute_graveyard_stats(subs, rates, base_currency),
        redundancies: compute_redundancy_insights(subs, rates, base_currency, safe_categories),
        runway: compute_runway(subs, rates, base_currency, today),
    }
}

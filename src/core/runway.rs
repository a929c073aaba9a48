//! Cash-flow projection over the next 30, 60 and 90 days.

use crate::core::analytics::{CostPolicy, RunwayPolicy};
use crate::core::currency::{RateTable, convert};
use crate::core::subscription::Subscription;
use chrono::NaiveDate;
use tracing::debug;

pub const HORIZON_DAYS: i64 = 90;
const MAX_OCCURRENCES: usize = 12;

/// Cumulative projected spend. A charge inside 30 days is also part of the
/// 60 and 90 day figures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunwayProjection {
    pub d30: f64,
    pub d60: f64,
    pub d90: f64,
}

impl RunwayProjection {
    fn add(&mut self, days_from_now: i64, amount: f64) {
        if days_from_now < 0 {
            return;
        }
        if days_from_now <= 30 {
            self.d30 += amount;
        }
        if days_from_now <= 60 {
            self.d60 += amount;
        }
        if days_from_now <= HORIZON_DAYS {
            self.d90 += amount;
        }
    }
}

/// Rolls each active subscription's renewal forward from its next renewal
/// date and accumulates the charges falling inside the horizon.
///
/// Trials are included and the full cost is used, see [`RunwayPolicy`].
/// Subscriptions with an unsupported frequency contribute their next
/// renewal only.
pub fn compute_runway(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    today: NaiveDate,
) -> RunwayProjection {
    let policy = RunwayPolicy;
    let mut projection = RunwayProjection::default();

    for sub in subs.iter().filter(|sub| policy.includes(sub)) {
        let cost = convert(policy.cost_of(sub), &sub.currency, base_currency, rates);
        let mut renewal = sub.next_renewal_date;

        for _ in 0..MAX_OCCURRENCES {
            let days_from_now = (renewal - today).num_days();
            if days_from_now > HORIZON_DAYS {
                break;
            }
            projection.add(days_from_now, cost);

            match sub.frequency.advance(renewal) {
                Some(next) => renewal = next,
                None => {
                    debug!(
                        "Not projecting past {renewal} for {}: frequency {}",
                        sub.vendor, sub.frequency
                    );
                    break;
                }
            }
        }
    }

    debug!("Runway in {base_currency}: {projection:?}");
    projection
}

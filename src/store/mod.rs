//! State kept between runs: when each subscription was last reminded and
//! recently fetched exchange rates.

pub mod disk;
pub mod memory;
pub mod rates;

use crate::core::subscription::Subscription;
use anyhow::Result;
use chrono::{DateTime, Utc};

pub use disk::DiskNotificationLog;
pub use memory::MemoryNotificationLog;
pub use rates::DiskRateCache;

pub trait NotificationLog: Send + Sync {
    fn last_notified(&self, subscription_id: &str) -> Result<Option<DateTime<Utc>>>;
    fn mark_notified(&self, subscription_id: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Overlays logged notification times onto `subs`, keeping the most recent
/// of the logged and the configured value.
pub fn apply_notification_log(
    subs: &mut [Subscription],
    log: &dyn NotificationLog,
) -> Result<()> {
    for sub in subs.iter_mut() {
        if let Some(logged) = log.last_notified(&sub.id)? {
            sub.last_notified_at = Some(match sub.last_notified_at {
                Some(existing) => existing.max(logged),
                None => logged,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subscription::test_support::{date, subscription};
    use chrono::TimeZone;

    #[test]
    fn test_apply_notification_log_keeps_latest() {
        let log = MemoryNotificationLog::new();
        let earlier = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap();

        let mut from_config = subscription("a", 1.0, date(2026, 10, 20));
        from_config.last_notified_at = Some(later);
        let never = subscription("b", 1.0, date(2026, 10, 20));
        let untouched = subscription("c", 1.0, date(2026, 10, 20));

        log.mark_notified("a", earlier).unwrap();
        log.mark_notified("b", earlier).unwrap();

        let mut subs = vec![from_config, never, untouched];
        apply_notification_log(&mut subs, &log).unwrap();

        assert_eq!(subs[0].last_notified_at, Some(later));
        assert_eq!(subs[1].last_notified_at, Some(earlier));
        assert_eq!(subs[2].last_notified_at, None);
    }
}

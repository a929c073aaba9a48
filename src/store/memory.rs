use super::NotificationLog;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Process-local log, used for dry runs and tests.
#[derive(Default)]
pub struct MemoryNotificationLog {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationLog for MemoryNotificationLog {
    fn last_notified(&self, subscription_id: &str) -> Result<Option<DateTime<Utc>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("Notification log lock poisoned"))?;
        Ok(entries.get(subscription_id).copied())
    }

    fn mark_notified(&self, subscription_id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("Notification log lock poisoned"))?;
        debug!("Marking {subscription_id} notified at {at}");
        entries.insert(subscription_id.to_string(), at);
        Ok(())
    }
}

use super::NotificationLog;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "notifications";

/// Notification log persisted in a fjall keyspace under the data directory.
///
/// Keys are subscription ids, values are JSON encoded UTC timestamps.
pub struct DiskNotificationLog {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskNotificationLog {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open notification log at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open notification partition")?;
        debug!("Opened notification log at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl NotificationLog for DiskNotificationLog {
    fn last_notified(&self, subscription_id: &str) -> Result<Option<DateTime<Utc>>> {
        match self.partition.get(subscription_id)? {
            Some(value) => {
                let at: DateTime<Utc> = serde_json::from_slice(&value).with_context(|| {
                    format!("Corrupt notification entry for {subscription_id}")
                })?;
                Ok(Some(at))
            }
            None => Ok(None),
        }
    }

    fn mark_notified(&self, subscription_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.partition
            .insert(subscription_id, serde_json::to_vec(&at)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Persisted notification for {subscription_id} at {at}");
        Ok(())
    }
}

use crate::core::currency::{RateTable, RateTableCache};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

const PARTITION: &str = "rates";

#[derive(Serialize, Deserialize)]
struct CachedRates {
    rates: RateTable,
    expires_at: SystemTime,
}

/// Rate tables kept on disk between runs, each valid for `ttl` after it was
/// fetched.
pub struct DiskRateCache {
    keyspace: Keyspace,
    partition: PartitionHandle,
    ttl: Duration,
}

impl DiskRateCache {
    pub fn open(path: &Path, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open rate cache at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open rate partition")?;

        Ok(Self {
            keyspace,
            partition,
            ttl,
        })
    }

    fn read(&self, base: &str) -> Result<Option<RateTable>> {
        let Some(value) = self.partition.get(base)? else {
            debug!("Rate cache MISS for {base}");
            return Ok(None);
        };
        let entry: CachedRates = serde_json::from_slice(&value)?;
        if SystemTime::now() >= entry.expires_at {
            debug!("Rate cache entry expired for {base}");
            self.partition.remove(base)?;
            return Ok(None);
        }
        debug!("Rate cache HIT for {base}");
        Ok(Some(entry.rates))
    }

    fn write(&self, base: &str, rates: RateTable) -> Result<()> {
        let entry = CachedRates {
            rates,
            expires_at: SystemTime::now() + self.ttl,
        };
        self.partition.insert(base, serde_json::to_vec(&entry)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Rate cache PUT for {base}");
        Ok(())
    }
}

#[async_trait]
impl RateTableCache for DiskRateCache {
    async fn get(&self, base: &str) -> Option<RateTable> {
        self.read(base).unwrap_or_else(|e| {
            debug!("Rate cache read error for {base}: {e}");
            None
        })
    }

    async fn put(&self, base: &str, rates: RateTable) {
        if let Err(e) = self.write(base, rates) {
            debug!("Rate cache write error for {base}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn usd_rates() -> RateTable {
        [("USD", 1.0), ("PHP", 55.0)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_rates_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let cache = DiskRateCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
            assert!(cache.get("USD").await.is_none());
            cache.put("USD", usd_rates()).await;
        }

        let cache = DiskRateCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(cache.get("USD").await, Some(usd_rates()));
        assert!(cache.get("EUR").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_rates_are_dropped() {
        let dir = tempdir().unwrap();
        let cache = DiskRateCache::open(dir.path(), Duration::from_millis(10)).unwrap();
        cache.put("USD", usd_rates()).await;

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("USD").await.is_none());
        assert!(cache.partition.get("USD").unwrap().is_none());
    }
}

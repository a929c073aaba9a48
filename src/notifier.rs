//! Delivers reminder alerts and records which ones went out.

use crate::core::config::NotificationConfig;
use crate::core::notify::{Alert, select_due};
use crate::core::subscription::Subscription;
use crate::store::NotificationLog;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::sync::Mutex;
use tracing::{debug, info, warn};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert, user_name: &str) -> Result<()>;
}

/// Writes rendered reminders to a terminal or any other writer.
pub struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleNotifier<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| anyhow!("Console notifier lock poisoned"))
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    async fn send(&self, alert: &Alert, user_name: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("Console notifier lock poisoned"))?;
        writeln!(out, "Subject: {}", alert.subject())?;
        writeln!(out, "{}\n", alert.body(user_name))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub alert: Alert,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DigestReport {
    pub deliveries: Vec<Delivery>,
    /// Due alerts left for a later run because of `max_per_run`.
    pub deferred: usize,
}

impl DigestReport {
    pub fn sent(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Sent)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.sent()
    }
}

/// Sends every due reminder, at most `max_per_run` of them, one at a time.
///
/// A subscription is marked notified only after its send succeeded, so a
/// failed delivery is retried by the next run.
pub async fn run_digest(
    subs: &[Subscription],
    now: DateTime<Utc>,
    config: &NotificationConfig,
    notifier: &dyn Notifier,
    log: &dyn NotificationLog,
) -> Result<DigestReport> {
    let due = select_due(subs, now, config.alert_window_days);
    let deferred = due.len().saturating_sub(config.max_per_run);
    if due.is_empty() {
        info!("No notifications needed");
        return Ok(DigestReport::default());
    }
    debug!(
        "{} alerts due, sending up to {}",
        due.len(),
        config.max_per_run
    );

    let mut deliveries = Vec::new();
    for alert in due.alerts.into_iter().take(config.max_per_run) {
        let status = match notifier.send(&alert, &config.user_name).await {
            Ok(()) => {
                log.mark_notified(&alert.subscription_id, now)?;
                DeliveryStatus::Sent
            }
            Err(e) => {
                warn!(subscription = %alert.subscription_id, error = %e, "Failed to send reminder");
                DeliveryStatus::Failed(e.to_string())
            }
        };
        deliveries.push(Delivery { alert, status });
    }

    let report = DigestReport {
        deliveries,
        deferred,
    };
    info!(
        sent = report.sent(),
        failed = report.failed(),
        deferred = report.deferred,
        "Digest finished"
    );
    Ok(report)
}

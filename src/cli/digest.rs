use super::ui;
use crate::core::config::AppConfig;
use crate::core::currency::format_amount;
use crate::core::notify::{Alert, AlertKind, select_expiring_trials};
use crate::notifier::{ConsoleNotifier, DeliveryStatus, DigestReport, run_digest};
use crate::store::{
    DiskNotificationLog, MemoryNotificationLog, NotificationLog, apply_notification_log,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color};
use tracing::debug;

fn report_table(report: &DigestReport) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Subscription"),
        ui::header_cell("Alert"),
        ui::header_cell("Status"),
    ]);
    for delivery in &report.deliveries {
        let status = match &delivery.status {
            DeliveryStatus::Sent => Cell::new("sent").fg(Color::Green),
            DeliveryStatus::Failed(e) => Cell::new(format!("failed: {e}")).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&delivery.alert.vendor),
            Cell::new(delivery.alert.kind),
            status,
        ]);
    }
    table.to_string()
}

/// Runs the reminder digest. A dry run keeps notification state in memory
/// so nothing is recorded as sent.
pub async fn run(config: &AppConfig, now: DateTime<Utc>, dry_run: bool) -> Result<()> {
    let log: Box<dyn NotificationLog> = if dry_run {
        Box::new(MemoryNotificationLog::new())
    } else {
        let path = config.default_data_path()?.join("notifications");
        debug!("Using notification log at {}", path.display());
        Box::new(DiskNotificationLog::open(&path)?)
    };

    let mut subs = config.subscriptions.clone();
    apply_notification_log(&mut subs, log.as_ref())?;

    let notifier = ConsoleNotifier::stdout();
    let report = run_digest(&subs, now, &config.notifications, &notifier, log.as_ref()).await?;

    if report.deliveries.is_empty() {
        println!("No notifications needed.");
        return Ok(());
    }

    println!("{}", report_table(&report));
    if report.deferred > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("{} more reminders deferred to the next run.", report.deferred),
                ui::StyleType::Warning
            )
        );
    }
    Ok(())
}

fn trials_table(trials: &[Alert]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Vendor"),
        ui::header_cell("Converts"),
        ui::header_cell("Days Left"),
        ui::header_cell("Renewal Cost"),
    ]);
    for alert in trials {
        let days_left = match alert.kind {
            AlertKind::TrialEnding { days_left } => days_left,
            AlertKind::Renewal => 0,
        };
        table.add_row(vec![
            Cell::new(&alert.vendor),
            Cell::new(alert.renewal_date.format("%b %-d, %Y")),
            ui::days_left_cell(days_left),
            Cell::new(format_amount(alert.amount, &alert.currency)),
        ]);
    }
    table.to_string()
}

/// Lists trials converting within the configured trial window.
pub fn run_trials(config: &AppConfig, now: DateTime<Utc>) -> Result<()> {
    let trials = select_expiring_trials(
        &config.subscriptions,
        now,
        config.notifications.trial_window_days,
    );
    if trials.is_empty() {
        println!("No trials ending soon.");
        return Ok(());
    }
    println!(
        "{}\n\n{}",
        ui::style_text("Trials Ending Soon", ui::StyleType::Title),
        trials_table(&trials)
    );
    Ok(())
}

use super::ui;
use crate::core::analytics::{UpcomingRenewal, upcoming_renewals};
use crate::core::currency::RateTable;
use crate::core::subscription::Subscription;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn render(renewals: &[UpcomingRenewal]) -> String {
    if renewals.is_empty() {
        return format!(
            "{}\n{}",
            ui::style_text("All caught up!", ui::StyleType::TotalLabel),
            ui::style_text("No active subscriptions due.", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Vendor"),
        ui::header_cell("Renews"),
        ui::header_cell("Due In"),
        ui::header_cell("Amount"),
    ]);
    for renewal in renewals {
        table.add_row(vec![
            Cell::new(&renewal.vendor),
            Cell::new(renewal.next_renewal_date.format("%b %-d, %Y")),
            ui::days_left_cell(renewal.days_left),
            ui::money_cell(renewal.cost, &renewal.currency),
        ]);
    }
    format!(
        "{}\n\n{}",
        ui::style_text("Upcoming Bills", ui::StyleType::Title),
        table
    )
}

pub fn run(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    today: NaiveDate,
    limit: usize,
) -> Result<()> {
    let renewals = upcoming_renewals(subs, rates, base_currency, today, limit);
    println!("{}", render(&renewals));
    Ok(())
}

use super::ui;
use crate::core::analytics::{compute_monthly_burn, monthly_cost_in_base};
use crate::core::currency::{RateTable, format_amount};
use crate::core::subscription::{Status, Subscription};
use anyhow::Result;
use comfy_table::{Cell, Color};

pub fn render(subs: &[Subscription], rates: &RateTable, base_currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Vendor"),
        ui::header_cell("Category"),
        ui::header_cell("Status"),
        ui::header_cell("Billing"),
        ui::header_cell("Cost"),
        ui::header_cell("My Share"),
        ui::header_cell(&format!("Monthly ({base_currency})")),
        ui::header_cell("Next Renewal"),
    ]);

    for sub in subs {
        let status = match (sub.status, sub.is_trial) {
            (Status::Active, true) => Cell::new("Trial").fg(Color::Yellow),
            (Status::Active, false) => Cell::new(sub.status).fg(Color::Green),
            (Status::Paused, _) => Cell::new(sub.status).fg(Color::DarkGrey),
            (Status::Cancelled, _) => Cell::new(sub.status).fg(Color::Red),
        };
        let split = sub.split_cost.filter(|split| *split > 0.0);

        table.add_row(vec![
            Cell::new(&sub.vendor),
            Cell::new(&sub.category),
            status,
            Cell::new(&sub.frequency),
            ui::money_cell(sub.cost, &sub.currency),
            ui::format_optional_cell(split, |s| format_amount(s, &sub.currency)),
            ui::money_cell(monthly_cost_in_base(sub, rates, base_currency), base_currency),
            Cell::new(sub.next_renewal_date.format("%Y-%m-%d")),
        ]);
    }

    let burn = compute_monthly_burn(subs, rates, base_currency);
    format!(
        "{}\n\n{}\n\n{} {}",
        ui::style_text("Subscriptions", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("Monthly Burn ({base_currency}):"),
            ui::StyleType::TotalLabel
        ),
        ui::style_text(
            &format_amount(burn, base_currency),
            ui::StyleType::TotalValue
        )
    )
}

pub fn run(subs: &[Subscription], rates: &RateTable, base_currency: &str) -> Result<()> {
    println!("{}", render(subs, rates, base_currency));
    Ok(())
}

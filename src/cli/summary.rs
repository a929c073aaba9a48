use super::ui;
use crate::core::analytics::{Dashboard, compute_dashboard};
use crate::core::currency::{RateTable, format_amount};
use crate::core::subscription::Subscription;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

impl Dashboard {
    pub fn display_as_table(&self) -> String {
        let currency = &self.base_currency;

        let mut stats = ui::new_styled_table();
        stats.set_header(vec![
            ui::header_cell("Monthly Burn"),
            ui::header_cell("Annual Projection"),
            ui::header_cell("Active Trials"),
            ui::header_cell("Saved / Month"),
        ]);
        stats.add_row(vec![
            ui::money_cell(self.monthly_burn, currency),
            ui::money_cell(self.annual_projection, currency),
            Cell::new(self.active_trials),
            ui::money_cell(self.graveyard.total_saved_monthly, currency),
        ]);

        let mut runway = ui::new_styled_table();
        runway.set_header(vec![
            ui::header_cell("Next 30 days"),
            ui::header_cell("Next 60 days"),
            ui::header_cell("Next 90 days"),
        ]);
        runway.add_row(vec![
            ui::money_cell(self.runway.d30, currency),
            ui::money_cell(self.runway.d60, currency),
            ui::money_cell(self.runway.d90, currency),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("Overview ({currency})"), ui::StyleType::Title)
        );
        output.push_str(&stats.to_string());
        output.push_str(&format!(
            "\n\n{}\n\n",
            ui::style_text("Cash-flow Runway", ui::StyleType::Title)
        ));
        output.push_str(&runway.to_string());

        if !self.redundancies.is_empty() {
            let categories: Vec<&str> = self
                .redundancies
                .iter()
                .map(|group| group.category.as_str())
                .collect();
            output.push_str(&format!(
                "\n\n{} {}",
                ui::style_text("Possible duplicates in:", ui::StyleType::Warning),
                categories.join(", ")
            ));
        }

        output.push_str(&format!(
            "\n\nYou spend {} a month on subscriptions.",
            ui::style_text(
                &format_amount(self.monthly_burn, currency),
                ui::StyleType::TotalValue
            )
        ));
        output
    }
}

pub fn run<S: AsRef<str>>(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    safe_categories: &[S],
    today: NaiveDate,
) -> Result<()> {
    if subs.is_empty() {
        println!("No subscriptions configured yet. Add some to your config file.");
        return Ok(());
    }

    let dashboard = compute_dashboard(subs, rates, base_currency, safe_categories, today);
    println!("{}", dashboard.display_as_table());
    Ok(())
}

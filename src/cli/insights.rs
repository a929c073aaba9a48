use super::ui;
use crate::core::analytics::{
    CategorySpend, GraveyardStats, RedundancyGroup, compute_category_breakdown,
    compute_graveyard_stats, compute_redundancy_insights,
};
use crate::core::currency::{RateTable, format_amount};
use crate::core::subscription::Subscription;
use anyhow::Result;
use comfy_table::Cell;

fn redundancy_table(groups: &[RedundancyGroup], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Count"),
        ui::header_cell("Vendors"),
        ui::header_cell("Monthly Cost"),
    ]);
    for group in groups {
        table.add_row(vec![
            Cell::new(&group.category),
            Cell::new(group.count),
            Cell::new(group.vendors.join(", ")),
            ui::money_cell(group.total_monthly_cost, currency),
        ]);
    }
    table.to_string()
}

fn category_table(breakdown: &[CategorySpend], currency: &str) -> String {
    let total: f64 = breakdown.iter().map(|c| c.monthly_cost).sum();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Monthly Cost"),
        ui::header_cell("Share (%)"),
    ]);
    for category in breakdown {
        let share = (total > 0.0).then(|| category.monthly_cost / total * 100.0);
        table.add_row(vec![
            Cell::new(&category.category),
            ui::money_cell(category.monthly_cost, currency),
            ui::format_optional_cell(share, |s| format!("{s:.1}%")),
        ]);
    }
    table.to_string()
}

pub fn render<S: AsRef<str>>(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    safe_categories: &[S],
) -> String {
    let redundancies = compute_redundancy_insights(subs, rates, base_currency, safe_categories);
    let graveyard: GraveyardStats = compute_graveyard_stats(subs, rates, base_currency);
    let breakdown = compute_category_breakdown(subs, rates, base_currency);

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Redundancy Check", ui::StyleType::Title)
    );
    if redundancies.is_empty() {
        output.push_str(&ui::style_text(
            "No overlapping subscriptions found.",
            ui::StyleType::Subtle,
        ));
    } else {
        output.push_str(&redundancy_table(&redundancies, base_currency));
    }

    output.push_str(&format!(
        "\n\n{}\n\n",
        ui::style_text("Spend by Category", ui::StyleType::Title)
    ));
    if breakdown.is_empty() {
        output.push_str(&ui::style_text("No active spend.", ui::StyleType::Subtle));
    } else {
        output.push_str(&category_table(&breakdown, base_currency));
    }

    output.push_str(&format!(
        "\n\n{}\n\n",
        ui::style_text("Graveyard", ui::StyleType::Title)
    ));
    output.push_str(&format!(
        "{} cancelled, saving {} a month.",
        graveyard.count,
        ui::style_text(
            &format_amount(graveyard.total_saved_monthly, base_currency),
            ui::StyleType::TotalValue
        )
    ));
    output
}

pub fn run<S: AsRef<str>>(
    subs: &[Subscription],
    rates: &RateTable,
    base_currency: &str,
    safe_categories: &[S],
) -> Result<()> {
    println!("{}", render(subs, rates, base_currency, safe_categories));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::SAFE_CATEGORIES;
    use crate::core::subscription::Status;
    use crate::core::subscription::test_support::{date, subscription};

    #[test]
    fn test_render_insights() {
        let mut netflix = subscription("n", 15.0, date(2026, 11, 1));
        netflix.vendor = "Netflix".to_string();
        let mut hulu = subscription("h", 10.0, date(2026, 11, 1));
        hulu.vendor = "Hulu".to_string();
        let mut gym = subscription("g", 40.0, date(2026, 11, 1));
        gym.status = Status::Cancelled;

        let output = render(
            &[netflix, hulu, gym],
            &RateTable::new(),
            "USD",
            &SAFE_CATEGORIES,
        );
        assert!(output.contains("Netflix, Hulu"));
        assert!(output.contains("$25.00"));
        assert!(output.contains("100.0%"));
        assert!(output.contains("1 cancelled"));
        assert!(output.contains("$40.00"));
    }

    #[test]
    fn test_render_without_insights() {
        let output = render(&[], &RateTable::new(), "EUR", &SAFE_CATEGORIES);
        assert!(output.contains("No overlapping subscriptions found."));
        assert!(output.contains("€0.00"));
    }
}

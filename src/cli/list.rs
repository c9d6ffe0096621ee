use super::ui;
use crate::core::analytics::DashboardView;
use comfy_table::Cell;

impl DashboardView {
    /// Every subscription in store order, with its monthly equivalent.
    pub fn display_list(&self, currency: &str) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("All subscriptions", ui::StyleType::Title)
        );

        if self.subscriptions.is_empty() {
            output.push_str(&ui::style_text(
                "No subscriptions yet. Add one with `subtrack add`.",
                ui::StyleType::Subtle,
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("ID"),
            ui::header_cell("Name"),
            ui::header_cell("Category"),
            ui::header_cell("Billing"),
            ui::header_cell(&format!("Cost ({currency})")),
            ui::header_cell(&format!("Monthly ({currency})")),
            ui::header_cell("Next payment"),
        ]);
        for sub in &self.subscriptions {
            table.add_row(vec![
                Cell::new(ui::style_text(sub.id.as_str(), ui::StyleType::Subtle)),
                Cell::new(&sub.name),
                Cell::new(ui::capitalize_first(&sub.category)),
                Cell::new(ui::capitalize_first(sub.billing.as_str())),
                ui::amount_cell(sub.cost),
                ui::amount_cell(sub.monthly_cost()),
                Cell::new(ui::format_date(sub.next_payment)),
            ]);
        }
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text(&format!("Total monthly ({currency}):"), ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_monthly_cost),
                ui::StyleType::TotalValue
            ),
        ));
        output
    }
}

#[cfg(test)]
mod tests {
    use crate::core::analytics::DashboardView;
    use crate::core::subscription::{BillingCycle, Subscription, SubscriptionId};
    use chrono::NaiveDate;

    #[test]
    fn test_display_list() {
        console::set_colors_enabled(false);
        let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let subs = vec![Subscription {
            id: SubscriptionId::new("abc"),
            name: "Gym".to_string(),
            cost: 10.0,
            billing: BillingCycle::Weekly,
            category: "health".to_string(),
            next_payment: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        }];

        let output = DashboardView::compute(&subs, today, 5).display_list("EUR");

        assert!(output.contains("abc"));
        assert!(output.contains("Gym"));
        assert!(output.contains("Health"));
        assert!(output.contains("43.30"));
        assert!(output.contains("Nov 03, 2025"));
        assert!(output.contains("Total monthly (EUR): 43.30"));
    }

    #[test]
    fn test_display_list_empty() {
        console::set_colors_enabled(false);
        let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let output = DashboardView::compute(&[], today, 5).display_list("EUR");
        assert!(output.contains("No subscriptions yet"));
    }
}

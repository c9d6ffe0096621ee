use super::ui;
use crate::core::analytics::{CategoryBreakdown, DashboardView};
use comfy_table::Cell;

impl DashboardView {
    pub fn display_summary(&self, currency: &str) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Subscriptions", ui::StyleType::Title)
        );
        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}\n",
            ui::style_text("Active subscriptions:", ui::StyleType::TotalLabel),
            self.total_count,
            ui::style_text(&format!("Monthly cost ({currency}):"), ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_monthly_cost),
                ui::StyleType::TotalValue
            ),
            ui::style_text(&format!("Yearly cost ({currency}):"), ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2}", self.total_yearly_cost),
                ui::StyleType::TotalValue
            ),
        ));

        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("Spending by category", ui::StyleType::Title)
        ));
        output.push_str(&self.category_table(currency));

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text("Upcoming payments", ui::StyleType::Title)
        ));
        output.push_str(&self.upcoming_table(currency));
        output
    }

    fn category_table(&self, currency: &str) -> String {
        let totals = match &self.categories {
            CategoryBreakdown::NoData => {
                return ui::style_text("No data available", ui::StyleType::Subtle);
            }
            CategoryBreakdown::Totals(totals) => totals,
        };

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell(&format!("Monthly ({currency})")),
            ui::header_cell("Share (%)"),
        ]);
        for total in totals {
            let share = if self.total_monthly_cost > 0.0 {
                total.monthly_cost / self.total_monthly_cost * 100.0
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new(ui::capitalize_first(&total.category)),
                ui::amount_cell(total.monthly_cost),
                ui::amount_cell(share),
            ]);
        }
        table.to_string()
    }

    fn upcoming_table(&self, currency: &str) -> String {
        if self.upcoming.is_empty() {
            return ui::style_text("No upcoming payments", ui::StyleType::Subtle);
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Subscription"),
            ui::header_cell("Due"),
            ui::header_cell("In"),
            ui::header_cell(&format!("Amount ({currency})")),
        ]);
        for payment in &self.upcoming {
            table.add_row(vec![
                Cell::new(&payment.name),
                Cell::new(ui::format_date(payment.due)),
                ui::days_cell(payment.days_until),
                ui::amount_cell(payment.cost),
            ]);
        }
        table.to_string()
    }
}

//! Report formatting for terminal output

use crate::ledger::CategoryTree;
use crate::models::{Money, YearMonth};
use crate::reports::{BudgetStatus, CategoryBudgetReport, ForecastPoint, ForecastSummary};

use super::transaction::{category_name, truncate};

/// Format a forecast as a dated balance table followed by its summary
pub fn format_forecast(points: &[ForecastPoint], summary: &ForecastSummary, tree: &CategoryTree) -> String {
    let mut output = String::new();
    output.push_str(&format!("Opening balance: {}\n\n", summary.opening));

    if points.is_empty() {
        output.push_str("No activity in the forecast window.\n");
    } else {
        output.push_str(&format!(
            "{:10} {:9} {:16} {:>16} {:>16}\n",
            "Date", "Kind", "Category", "Amount", "Balance"
        ));
        output.push_str(&separator(71));
        output.push('\n');
        for point in points {
            output.push_str(&format!(
                "{} {:9} {} {:>16} {:>16}\n",
                point.date.format("%Y-%m-%d"),
                point.transaction.kind.to_string(),
                truncate(&category_name(&point.transaction, tree), 16),
                point.transaction.amount.to_string(),
                point.balance.to_string()
            ));
        }
        output.push_str(&separator(71));
        output.push('\n');
    }

    output.push_str(&format!("Inflow:  {}\n", summary.inflow));
    output.push_str(&format!("Outflow: {}\n", summary.outflow));
    output.push_str(&format!("Closing: {}\n", summary.closing));
    if let Some((date, lowest)) = summary.lowest {
        let warning = if lowest.is_negative() { "  (below zero)" } else { "" };
        output.push_str(&format!(
            "Lowest:  {} on {}{}\n",
            lowest,
            date.format("%Y-%m-%d"),
            warning
        ));
    }
    output
}

/// Format a monthly budget evaluation
pub fn format_budget(month: YearMonth, reports: &[CategoryBudgetReport]) -> String {
    let mut output = String::new();
    output.push_str(&format!("Budget for {}\n\n", month));

    if reports.is_empty() {
        output.push_str("No categories found.\n");
        return output;
    }

    output.push_str(&format!(
        "{:20} {:>16} {:>16} {:>16}  {}\n",
        "Category", "Spent", "Limit", "Remaining", "Status"
    ));
    output.push_str(&separator(80));
    output.push('\n');

    for report in reports {
        let mut name = report.name.clone();
        if report.archived {
            name.push_str(" *");
        }
        output.push_str(&format!(
            "{} {:>16} {:>16} {:>16}  {}\n",
            truncate(&name, 20),
            report.spent.to_string(),
            optional(report.limit),
            optional(report.remaining),
            report.status
        ));
    }

    let over = reports
        .iter()
        .filter(|r| r.status == BudgetStatus::Over)
        .count();
    output.push_str(&separator(80));
    output.push('\n');
    if over > 0 {
        output.push_str(&format!("{} category(ies) over limit\n", over));
    }
    if reports.iter().any(|r| r.archived) {
        output.push_str("* archived\n");
    }
    output
}

fn optional(amount: Option<Money>) -> String {
    amount.map_or_else(|| "-".to_string(), |m| m.to_string())
}

fn separator(width: usize) -> String {
    "─".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryId, Currency, Transaction};
    use crate::reports::running_balance;
    use chrono::NaiveDate;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::USD)
    }

    #[test]
    fn test_forecast_output() {
        let mut tree = CategoryTree::new();
        let food = tree.insert(Category::new("Food")).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let points = running_balance(vec![Transaction::actual(date, usd(-20_000), food)], usd(10_000)).unwrap();
        let summary = ForecastSummary::from_points(usd(10_000), &points).unwrap();

        let output = format_forecast(&points, &summary, &tree);
        assert!(output.contains("Opening balance: 100.00 USD"));
        assert!(output.contains("-100.00 USD"));
        assert!(output.contains("(below zero)"));
    }

    #[test]
    fn test_budget_output() {
        let reports = vec![
            CategoryBudgetReport {
                category_id: CategoryId::new(),
                name: "Dining".into(),
                archived: false,
                spent: usd(12_000),
                limit: Some(usd(10_000)),
                remaining: Some(usd(-2_000)),
                status: BudgetStatus::Over,
            },
            CategoryBudgetReport {
                category_id: CategoryId::new(),
                name: "Gifts".into(),
                archived: true,
                spent: usd(0),
                limit: None,
                remaining: None,
                status: BudgetStatus::Unlimited,
            },
        ];

        let output = format_budget(YearMonth::new(2025, 1).unwrap(), &reports);
        assert!(output.starts_with("Budget for 2025-01"));
        assert!(output.contains("-20.00 USD"));
        assert!(output.contains("OVER"));
        assert!(output.contains("1 category(ies) over limit"));
        assert!(output.contains("Gifts *"));
    }
}

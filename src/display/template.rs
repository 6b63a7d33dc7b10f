//! Recurrence template display formatting

use chrono::NaiveDate;

use super::transaction::truncate;
use crate::ledger::{recurrence, CategoryTree};
use crate::models::RecurrenceTemplate;

/// Format templates as a table with their next due date after `today`
pub fn format_template_list(
    templates: &[RecurrenceTemplate],
    tree: &CategoryTree,
    today: NaiveDate,
) -> String {
    if templates.is_empty() {
        return "No recurring transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:14} {:>16} {:10}  {}\n",
        "ID", "Category", "Amount", "Next", "Schedule"
    ));
    output.push_str(&"-".repeat(78));
    output.push('\n');

    for template in templates {
        let category = tree
            .get(template.category_id)
            .map_or_else(|| template.category_id.short(), |c| c.name.clone());
        let next = if template.active {
            let from = template
                .last_materialized
                .and_then(|d| d.succ_opt())
                .map_or(today, |after| after.max(today));
            recurrence::next_occurrence(template, from)
                .map_or_else(|| "ended".to_string(), |d| d.format("%Y-%m-%d").to_string())
        } else {
            "paused".to_string()
        };

        output.push_str(&format!(
            "{:12} {} {:>16} {:10}  {}",
            template.id.short(),
            truncate(&category, 14),
            template.amount.to_string(),
            next,
            template.rule
        ));
        if !template.note.is_empty() {
            output.push_str(&format!(" - {}", template.note));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency, Money, RecurrenceRule};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_next_due_and_paused() {
        let mut tree = CategoryTree::new();
        let rent = tree.insert(Category::new("Rent")).unwrap();
        let usd = |minor| Money::new(minor, Currency::USD);

        let active = RecurrenceTemplate::new(usd(-90_000), rent, date(1, 1), RecurrenceRule::monthly(1))
            .with_note("Rent");
        let mut paused = RecurrenceTemplate::new(usd(-1_000), rent, date(1, 1), RecurrenceRule::daily());
        paused.active = false;

        let output = format_template_list(&[active, paused], &tree, date(2, 10));
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[2].contains("2025-03-01"));
        assert!(lines[2].contains("monthly on day 1 - Rent"));
        assert!(lines[3].contains("paused"));
    }
}

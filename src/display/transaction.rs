//! Transaction display formatting

use crate::ledger::CategoryTree;
use crate::models::Transaction;

/// Format transactions as a register, one line each
pub fn format_transaction_register(transactions: &[Transaction], tree: &CategoryTree) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:16} {:>16}  {}\n",
        "ID", "Date", "Category", "Amount", "Note"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format!(
            "{:12} {} {} {:>16}  {}\n",
            txn.id.short(),
            txn.date.format("%Y-%m-%d"),
            truncate(&category_name(txn, tree), 16),
            txn.amount.to_string(),
            txn.note
        ));
    }

    output
}

/// Format every version of one logical transaction, oldest first
pub fn format_transaction_history(versions: &[Transaction], tree: &CategoryTree) -> String {
    let mut output = String::new();
    for txn in versions {
        let state = if txn.voided { "void" } else { "live" };
        output.push_str(&format!(
            "v{} {} [{}] {} {} {}",
            txn.version,
            txn.id.short(),
            state,
            txn.date.format("%Y-%m-%d"),
            txn.amount,
            category_name(txn, tree)
        ));
        if !txn.note.is_empty() {
            output.push_str(&format!(" ({})", txn.note));
        }
        output.push('\n');
    }
    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, tree: &CategoryTree) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", txn.amount));
    output.push_str(&format!("Category:    {}\n", category_name(txn, tree)));
    if !txn.note.is_empty() {
        output.push_str(&format!("Note:        {}\n", txn.note));
    }
    output.push_str(&format!("Version:     {}\n", txn.version));
    if let Some(replaced) = txn.amends {
        output.push_str(&format!("Amends:      {}\n", replaced.short()));
    }
    if let Some(template) = txn.template_id {
        output.push_str(&format!("Template:    {}\n", template.short()));
    }
    if txn.voided {
        output.push_str("Status:      voided\n");
    }

    output
}

pub(crate) fn category_name(txn: &Transaction, tree: &CategoryTree) -> String {
    tree.get(txn.category_id)
        .map_or_else(|| txn.category_id.short(), |c| c.name.clone())
}

/// Pad or cut a string to exactly `max_len` characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency, Money, TransactionAmendment};
    use chrono::NaiveDate;

    fn fixture() -> (CategoryTree, Transaction) {
        let mut tree = CategoryTree::new();
        let food = tree.insert(Category::new("Food")).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let txn = Transaction::actual(date, Money::new(-1250, Currency::USD), food).with_note("Lunch");
        (tree, txn)
    }

    #[test]
    fn test_register() {
        let (tree, txn) = fixture();
        let output = format_transaction_register(&[txn], &tree);
        assert!(output.contains("2025-01-05"));
        assert!(output.contains("Food"));
        assert!(output.contains("-12.50 USD"));
        assert!(output.contains("Lunch"));
        assert!(format_transaction_register(&[], &tree).contains("No transactions"));
    }

    #[test]
    fn test_history_marks_void() {
        let (tree, mut original) = fixture();
        let successor = original.successor(&TransactionAmendment {
            note: Some("Team lunch".into()),
            ..Default::default()
        });
        original.voided = true;

        let output = format_transaction_history(&[original, successor], &tree);
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[0].starts_with("v1") && lines[0].contains("[void]"));
        assert!(lines[1].starts_with("v2") && lines[1].contains("(Team lunch)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Food", 6), "Food  ");
        assert_eq!(truncate("Entertainment", 8), "Enter...");
    }
}

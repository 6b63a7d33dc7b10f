//! CSV export
//!
//! Writes transactions, forecasts and budget evaluations in a
//! spreadsheet-friendly layout. Amounts are written in major units with the
//! currency code in its own column.

use std::io::Write;

use crate::error::SaveResult;
use crate::ledger::CategoryTree;
use crate::models::{Money, Transaction};
use crate::reports::{CategoryBudgetReport, ForecastPoint};

/// Write every stored transaction version, voided ones included
pub fn export_transactions_csv<W: Write>(
    transactions: &[Transaction],
    tree: &CategoryTree,
    writer: W,
) -> SaveResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "ID", "Origin", "Version", "Date", "Category", "Amount", "Currency", "Note", "Voided",
        "Template",
    ])?;

    for txn in transactions {
        let category = category_label(tree, txn);
        let template = txn.template_id.map(|id| id.to_string()).unwrap_or_default();
        wtr.write_record([
            txn.id.to_string(),
            txn.origin.to_string(),
            txn.version.to_string(),
            txn.date.to_string(),
            category,
            major_units(&txn.amount),
            txn.amount.currency().to_string(),
            txn.note.clone(),
            txn.voided.to_string(),
            template,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a forecast as one row per dated balance change
pub fn export_forecast_csv<W: Write>(
    points: &[ForecastPoint],
    tree: &CategoryTree,
    writer: W,
) -> SaveResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Kind", "Category", "Note", "Amount", "Balance", "Currency"])?;

    for point in points {
        let txn = &point.transaction;
        wtr.write_record([
            point.date.to_string(),
            txn.kind.to_string(),
            category_label(tree, txn),
            txn.note.clone(),
            major_units(&txn.amount),
            major_units(&point.balance),
            point.balance.currency().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a monthly budget evaluation
pub fn export_budget_csv<W: Write>(reports: &[CategoryBudgetReport], writer: W) -> SaveResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "Category ID", "Category", "Archived", "Spent", "Limit", "Remaining", "Currency", "Status",
    ])?;

    for report in reports {
        wtr.write_record([
            report.category_id.to_string(),
            report.name.clone(),
            report.archived.to_string(),
            major_units(&report.spent),
            report.limit.as_ref().map(major_units).unwrap_or_default(),
            report.remaining.as_ref().map(major_units).unwrap_or_default(),
            report.spent.currency().to_string(),
            format!("{:?}", report.status).to_lowercase(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn category_label(tree: &CategoryTree, txn: &Transaction) -> String {
    tree.get(txn.category_id)
        .map_or_else(|| "Unknown".to_string(), |c| c.name.clone())
}

/// "-12.50" style amount without the currency suffix
fn major_units(amount: &Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let abs = amount.minor_units().unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

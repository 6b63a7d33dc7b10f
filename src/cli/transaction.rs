//! Transaction CLI commands

use clap::Subcommand;

use super::{date_or_today, parse_amount, parse_date};
use crate::config::Settings;
use crate::display::{
    format_transaction_details, format_transaction_history, format_transaction_register,
};
use crate::error::SaveResult;
use crate::ledger::CategoryFilter;
use crate::models::{TransactionAmendment, YearMonth};
use crate::services::Ledger;
use crate::storage::LedgerStorage;

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Amount (negative for spending, e.g. "-12.50")
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// Transaction date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List live transactions
    List {
        /// Start date (YYYY-MM-DD, default first of this month)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD, default today)
        #[arg(long)]
        to: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Include the category's descendants
        #[arg(long, requires = "category")]
        subtree: bool,
        /// Show at most this many (most recent)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Correct a transaction; the old version is kept in its history
    Amend {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Show every version of a transaction
    History {
        /// Transaction ID (any version)
        id: String,
    },

    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    settings: &Settings,
    cmd: TransactionCommands,
) -> SaveResult<()> {
    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            date,
            note,
        } => {
            let amount = parse_amount(&amount, settings.base_currency)?;
            let date = date_or_today(date.as_deref())?;
            let category = ledger.find_category(&category)?;

            let txn = ledger.record_transaction(date, amount, category.id, &note)?;
            println!("Recorded transaction: {}", txn.id.short());
            println!("  Date:     {}", txn.date.format(&settings.date_format));
            println!("  Amount:   {}", txn.amount);
            println!("  Category: {}", category.name);
        }

        TransactionCommands::List {
            from,
            to,
            category,
            subtree,
            limit,
        } => {
            let to = date_or_today(to.as_deref())?;
            let from = match from {
                Some(from) => parse_date(&from)?,
                None => YearMonth::current().first_day(),
            };

            let tree = ledger.category_tree()?;
            let filter = match category {
                Some(category) => {
                    let category = ledger.find_category(&category)?;
                    Some(if subtree {
                        CategoryFilter::new(tree.subtree(category.id))
                    } else {
                        CategoryFilter::single(category.id)
                    })
                }
                None => None,
            };

            let mut transactions = ledger.list_transactions(from..=to, filter.as_ref())?;
            if let Some(limit) = limit {
                let skip = transactions.len().saturating_sub(limit);
                transactions.drain(..skip);
            }
            print!("{}", format_transaction_register(&transactions, &tree));
        }

        TransactionCommands::Amend {
            id,
            amount,
            date,
            category,
            note,
        } => {
            let id = ledger.find_transaction(&id)?;
            let current = ledger.get_transaction(id)?;

            let changes = TransactionAmendment {
                date: date.map(|d| parse_date(&d)).transpose()?,
                amount: amount
                    .map(|a| parse_amount(&a, current.amount.currency()))
                    .transpose()?,
                category_id: category
                    .map(|c| ledger.find_category(&c).map(|c| c.id))
                    .transpose()?,
                note,
            };
            if changes.is_empty() {
                println!("No changes specified. Use --amount, --date, --category, or --note.");
                return Ok(());
            }

            let successor = ledger.amend_transaction(id, changes)?;
            println!(
                "Amended transaction {} (version {}): {}",
                current.id.short(),
                successor.version,
                successor.id.short()
            );
        }

        TransactionCommands::History { id } => {
            let id = ledger.find_transaction(&id)?;
            let versions = ledger.history(id)?;
            print!(
                "{}",
                format_transaction_history(&versions, &ledger.category_tree()?)
            );
        }

        TransactionCommands::Show { id } => {
            let id = ledger.find_transaction(&id)?;
            let txn = ledger.get_transaction(id)?;
            print!(
                "{}",
                format_transaction_details(&txn, &ledger.category_tree()?)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    #[test]
    fn test_add_and_amend() {
        let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
        let food = ledger.create_category("Food", None, None).unwrap();
        let settings = Settings::default();

        handle_transaction_command(
            &ledger,
            &settings,
            TransactionCommands::Add {
                amount: "-12.50".into(),
                category: "Food".into(),
                date: Some("2025-01-05".into()),
                note: "Lunch".into(),
            },
        )
        .unwrap();

        let range = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ..=NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let txn = ledger.list_transactions(range.clone(), None).unwrap().remove(0);
        assert_eq!(txn.amount, Money::new(-1250, Currency::USD));
        assert_eq!(txn.category_id, food.id);

        handle_transaction_command(
            &ledger,
            &settings,
            TransactionCommands::Amend {
                id: txn.id.short(),
                amount: Some("-10".into()),
                date: None,
                category: None,
                note: None,
            },
        )
        .unwrap();

        let listed = ledger.list_transactions(range, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, Money::new(-1000, Currency::USD));
        assert_eq!(ledger.history(txn.id).unwrap().len(), 2);
    }

    #[test]
    fn test_add_unknown_category() {
        let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
        let result = handle_transaction_command(
            &ledger,
            &Settings::default(),
            TransactionCommands::Add {
                amount: "-1".into(),
                category: "Nope".into(),
                date: None,
                note: String::new(),
            },
        );
        assert!(result.unwrap_err().is_unknown_reference());
    }
}

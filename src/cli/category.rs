//! Category CLI commands

use clap::Subcommand;

use super::parse_amount;
use crate::config::Settings;
use crate::display::{format_category_details, format_category_tree};
use crate::error::SaveResult;
use crate::services::Ledger;
use crate::storage::LedgerStorage;

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Show the category tree
    List,

    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// Parent category name or ID
        #[arg(short, long)]
        parent: Option<String>,
        /// Monthly spending limit (e.g., "400" or "400.00")
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Set or clear a monthly limit
    Limit {
        /// Category name or ID
        category: String,
        /// New limit amount
        amount: Option<String>,
        /// Remove the category's own limit
        #[arg(long, conflicts_with = "amount")]
        clear: bool,
    },

    /// Move a category under another parent
    Move {
        /// Category name or ID
        category: String,
        /// New parent name or ID
        #[arg(short, long, conflicts_with = "root")]
        to: Option<String>,
        /// Make it a top-level category
        #[arg(long)]
        root: bool,
    },

    /// Archive a category (its children must be archived first)
    Archive {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    settings: &Settings,
    cmd: CategoryCommands,
) -> SaveResult<()> {
    match cmd {
        CategoryCommands::List => {
            print!("{}", format_category_tree(&ledger.category_tree()?));
        }

        CategoryCommands::Add {
            name,
            parent,
            limit,
        } => {
            let parent = parent.map(|p| ledger.find_category(&p)).transpose()?;
            let limit = limit
                .map(|l| parse_amount(&l, settings.base_currency))
                .transpose()?;

            let category = ledger.create_category(&name, parent.as_ref().map(|p| p.id), limit)?;
            println!("Created category: {}", category.name);
            if let Some(parent) = parent {
                println!("  Parent: {}", parent.name);
            }
            if let Some(limit) = category.monthly_limit {
                println!("  Limit:  {}", limit);
            }
            println!("  ID:     {}", category.id);
        }

        CategoryCommands::Show { category } => {
            let category = ledger.find_category(&category)?;
            print!(
                "{}",
                format_category_details(&ledger.category_tree()?, &category)
            );
        }

        CategoryCommands::Rename { category, name } => {
            let category = ledger.find_category(&category)?;
            let renamed = ledger.rename_category(category.id, &name)?;
            println!("Renamed '{}' to '{}'", category.name, renamed.name);
        }

        CategoryCommands::Limit {
            category,
            amount,
            clear,
        } => {
            let category = ledger.find_category(&category)?;
            let limit = match (amount, clear) {
                (Some(amount), _) => Some(parse_amount(&amount, settings.base_currency)?),
                (None, true) => None,
                (None, false) => {
                    println!("No change specified. Give an amount or use --clear.");
                    return Ok(());
                }
            };

            let updated = ledger.set_category_limit(category.id, limit)?;
            match updated.monthly_limit {
                Some(limit) => println!("Limit for '{}' set to {}", updated.name, limit),
                None => println!("Limit for '{}' cleared", updated.name),
            }
        }

        CategoryCommands::Move { category, to, root } => {
            let category = ledger.find_category(&category)?;
            let parent = match (to, root) {
                (Some(to), _) => Some(ledger.find_category(&to)?),
                (None, true) => None,
                (None, false) => {
                    println!("No target specified. Use --to <PARENT> or --root.");
                    return Ok(());
                }
            };

            let moved = ledger.move_category(category.id, parent.as_ref().map(|p| p.id))?;
            match parent {
                Some(parent) => println!("Moved '{}' under '{}'", moved.name, parent.name),
                None => println!("Moved '{}' to the top level", moved.name),
            }
        }

        CategoryCommands::Archive { category } => {
            let category = ledger.find_category(&category)?;
            ledger.archive_category(category.id)?;
            println!("Archived category: {}", category.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money};
    use crate::storage::MemoryStorage;

    #[test]
    fn test_add_with_parent_and_limit() {
        let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
        let settings = Settings::default();

        handle_category_command(
            &ledger,
            &settings,
            CategoryCommands::Add {
                name: "Food".into(),
                parent: None,
                limit: Some("400".into()),
            },
        )
        .unwrap();
        handle_category_command(
            &ledger,
            &settings,
            CategoryCommands::Add {
                name: "Groceries".into(),
                parent: Some("food".into()),
                limit: None,
            },
        )
        .unwrap();

        let groceries = ledger.find_category("Groceries").unwrap();
        assert_eq!(
            ledger.effective_limit(groceries.id).unwrap(),
            Some(Money::new(40_000, Currency::USD))
        );
    }

    #[test]
    fn test_limit_clear() {
        let ledger = Ledger::open(MemoryStorage::new(), Currency::USD).unwrap();
        let food = ledger
            .create_category("Food", None, Some(Money::new(100, Currency::USD)))
            .unwrap();

        handle_category_command(
            &ledger,
            &Settings::default(),
            CategoryCommands::Limit {
                category: "Food".into(),
                amount: None,
                clear: true,
            },
        )
        .unwrap();
        assert_eq!(ledger.get_category(food.id).unwrap().monthly_limit, None);
    }
}

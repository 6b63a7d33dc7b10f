//! CLI commands for data export

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::info;

use super::{parse_amount, BudgetArgs, ForecastArgs};
use crate::config::Settings;
use crate::error::{SaveError, SaveResult};
use crate::export::{csv, json};
use crate::services::Ledger;
use crate::storage::LedgerStorage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the whole ledger to JSON
    All {
        /// Output file path
        output: PathBuf,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export every transaction version to CSV
    Transactions {
        /// Output file path
        output: PathBuf,
    },

    /// Export a balance forecast to CSV
    Forecast {
        /// Output file path
        output: PathBuf,
        #[command(flatten)]
        args: ForecastArgs,
    },

    /// Export a monthly budget evaluation to CSV
    Budget {
        /// Output file path
        output: PathBuf,
        #[command(flatten)]
        args: BudgetArgs,
    },

    /// Check that a JSON export is readable and consistent
    Verify {
        /// Export file to check
        input: PathBuf,
    },
}

/// Handle export commands
pub fn handle_export_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    settings: &Settings,
    cmd: ExportCommands,
) -> SaveResult<()> {
    match cmd {
        ExportCommands::All { output, pretty } => {
            let state = ledger.snapshot()?;
            json::export_full_json(&state, create(&output)?, pretty)?;
            println!("Ledger exported to: {}", output.display());
        }

        ExportCommands::Transactions { output } => {
            let state = ledger.snapshot()?;
            let transactions: Vec<_> = state.store.iter().cloned().collect();
            csv::export_transactions_csv(&transactions, &state.tree, create(&output)?)?;
            println!(
                "Exported {} transaction version(s) to: {}",
                transactions.len(),
                output.display()
            );
        }

        ExportCommands::Forecast { output, args } => {
            let (as_of, horizon_end) = args.window(settings)?;
            let opening = parse_amount(&args.balance, settings.base_currency)?;
            let points = ledger.forecast(as_of, horizon_end, opening)?;
            csv::export_forecast_csv(&points, &ledger.category_tree()?, create(&output)?)?;
            println!("Forecast exported to: {}", output.display());
        }

        ExportCommands::Budget { output, args } => {
            let month = args.month()?;
            let reports = ledger.evaluate_budget(month, args.mode())?;
            csv::export_budget_csv(&reports, create(&output)?)?;
            println!("Budget for {} exported to: {}", month, output.display());
        }

        ExportCommands::Verify { input } => {
            let contents = std::fs::read_to_string(&input).map_err(|e| {
                SaveError::Export(format!("Failed to read {}: {}", input.display(), e))
            })?;
            let export = json::read_export(&contents)?;
            println!(
                "{} is valid: {} categories, {} transaction versions ({} live), {} templates",
                input.display(),
                export.metadata.category_count,
                export.metadata.transaction_count,
                export.metadata.live_transaction_count,
                export.metadata.template_count
            );
        }
    }

    Ok(())
}

fn create(path: &Path) -> SaveResult<BufWriter<File>> {
    info!(path = %path.display(), "writing export");
    let file = File::create(path).map_err(|e| {
        SaveError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use isavemoney::audit::AuditLogger;
use isavemoney::cli::{
    handle_budget_command, handle_category_command, handle_export_command,
    handle_forecast_command, handle_template_command, handle_transaction_command, BudgetArgs,
    CategoryCommands, ExportCommands, ForecastArgs, TemplateCommands, TransactionCommands,
};
use isavemoney::config::{SavePaths, Settings};
use isavemoney::services::Ledger;
use isavemoney::storage::JsonStorage;

#[derive(Parser)]
#[command(
    name = "isave",
    version,
    about = "Ledger and budget projection for personal savings",
    long_about = "iSaveMoney keeps an append-only ledger of categorized transactions, \
                  projects recurring cash flows forward into a balance forecast, and \
                  checks monthly spending against category limits."
)]
struct Cli {
    /// Base directory for settings and ledger files
    #[arg(long, global = true, env = "ISAVEMONEY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init {
        /// Base currency for amounts entered on the command line
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Recurring transaction commands
    #[command(subcommand, alias = "recurring")]
    Template(TemplateCommands),

    /// Project the balance forward
    Forecast(ForecastArgs),

    /// Compare a month's spending with category limits
    Budget(BudgetArgs),

    /// Export data to CSV or JSON
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show paths and settings
    Show,
    /// Change a setting (base_currency, forecast_days, date_format, audit_enabled)
    Set { key: String, value: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "isavemoney=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => SavePaths::with_base_dir(dir),
        None => SavePaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("iSaveMoney - ledger and budget projection");
            println!();
            println!("Run 'isave --help' for usage information.");
            return Ok(());
        }
    };

    match &command {
        Commands::Init { currency } => {
            if let Some(currency) = currency {
                settings.set("base_currency", currency)?;
            }
            paths.ensure_directories()?;
            settings.save(&paths)?;
            info!(path = %paths.base_dir().display(), "initialized ledger");
            println!("Initialized iSaveMoney at: {}", paths.base_dir().display());
            println!("Base currency: {}", settings.base_currency);
            println!();
            println!("Run 'isave category add <NAME>' to create your first category.");
            return Ok(());
        }
        Commands::Config(ConfigCommands::Show) => {
            println!("iSaveMoney Configuration");
            println!("========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  base_currency: {}", settings.base_currency);
            println!("  forecast_days: {}", settings.forecast_days);
            println!("  date_format:   {}", settings.date_format);
            println!("  audit_enabled: {}", settings.audit_enabled);
            return Ok(());
        }
        Commands::Config(ConfigCommands::Set { key, value }) => {
            settings.set(key, value)?;
            settings.save(&paths)?;
            println!("Set {} = {}", key, value);
            return Ok(());
        }
        Commands::Audit { count } => {
            let entries = AuditLogger::new(paths.audit_log()).read_recent(*count)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
            return Ok(());
        }
        _ => {}
    }

    if !paths.is_initialized() {
        bail!(
            "No ledger found at {}. Run 'isave init' first.",
            paths.base_dir().display()
        );
    }

    let mut ledger = Ledger::open(JsonStorage::new(paths.clone())?, settings.base_currency)?;
    if settings.audit_enabled {
        ledger = ledger.with_audit(AuditLogger::new(paths.audit_log()));
    }

    match command {
        Commands::Category(cmd) => handle_category_command(&ledger, &settings, cmd)?,
        Commands::Txn(cmd) => handle_transaction_command(&ledger, &settings, cmd)?,
        Commands::Template(cmd) => handle_template_command(&ledger, &settings, cmd)?,
        Commands::Forecast(args) => handle_forecast_command(&ledger, &settings, args)?,
        Commands::Budget(args) => handle_budget_command(&ledger, args)?,
        Commands::Export(cmd) => handle_export_command(&ledger, &settings, cmd)?,
        Commands::Init { .. } | Commands::Config(_) | Commands::Audit { .. } => {}
    }

    Ok(())
}

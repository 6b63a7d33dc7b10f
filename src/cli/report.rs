//! Forecast and budget CLI commands

use chrono::{Duration, NaiveDate};
use clap::Args;

use super::{date_or_today, parse_amount, parse_date};
use crate::config::Settings;
use crate::display::{format_budget, format_forecast};
use crate::error::{SaveError, SaveResult};
use crate::models::{Money, YearMonth};
use crate::reports::{ForecastSummary, ProjectionMode};
use crate::services::Ledger;
use crate::storage::LedgerStorage;

/// Arguments for `isave forecast`
#[derive(Args, Debug, Default)]
pub struct ForecastArgs {
    /// Starting balance as of the as-of date
    #[arg(short, long, allow_negative_numbers = true, default_value = "0")]
    pub balance: String,
    /// Date the balance is known at (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<String>,
    /// Horizon in days after the as-of date (default from settings)
    #[arg(short, long, conflicts_with = "until")]
    pub days: Option<u32>,
    /// Last forecast date (YYYY-MM-DD)
    #[arg(short, long)]
    pub until: Option<String>,
}

impl ForecastArgs {
    /// The `(as_of, horizon_end)` pair these arguments describe
    pub(crate) fn window(&self, settings: &Settings) -> SaveResult<(NaiveDate, NaiveDate)> {
        let as_of = date_or_today(self.as_of.as_deref())?;
        let horizon_end = match (&self.until, self.days) {
            (Some(until), _) => parse_date(until)?,
            (None, days) => {
                let days = days.unwrap_or(settings.forecast_days);
                as_of
                    .checked_add_signed(Duration::days(i64::from(days)))
                    .ok_or_else(|| SaveError::Validation(format!("Horizon of {} days is out of range", days)))?
            }
        };
        Ok((as_of, horizon_end))
    }
}

/// Arguments for `isave budget`
#[derive(Args, Debug, Default)]
pub struct BudgetArgs {
    /// Month to evaluate (YYYY-MM, default current month)
    #[arg(short, long)]
    pub month: Option<String>,
    /// Count projected recurring transactions as spending
    #[arg(short = 'p', long)]
    pub include_projected: bool,
}

impl BudgetArgs {
    pub(crate) fn month(&self) -> SaveResult<YearMonth> {
        match &self.month {
            Some(month) => Ok(YearMonth::parse(month)?),
            None => Ok(YearMonth::current()),
        }
    }

    pub(crate) fn mode(&self) -> ProjectionMode {
        if self.include_projected {
            ProjectionMode::IncludeProjected
        } else {
            ProjectionMode::ActualOnly
        }
    }
}

/// Handle `isave forecast`
pub fn handle_forecast_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    settings: &Settings,
    args: ForecastArgs,
) -> SaveResult<()> {
    let (as_of, horizon_end) = args.window(settings)?;
    let opening: Money = parse_amount(&args.balance, settings.base_currency)?;

    let points = ledger.forecast(as_of, horizon_end, opening)?;
    let summary = ForecastSummary::from_points(opening, &points)?;

    println!(
        "Forecast from {} through {}",
        as_of.format(&settings.date_format),
        horizon_end.format(&settings.date_format)
    );
    print!(
        "{}",
        format_forecast(&points, &summary, &ledger.category_tree()?)
    );
    Ok(())
}

/// Handle `isave budget`
pub fn handle_budget_command<S: LedgerStorage>(
    ledger: &Ledger<S>,
    args: BudgetArgs,
) -> SaveResult<()> {
    let month = args.month()?;
    let reports = ledger.evaluate_budget(month, args.mode())?;
    print!("{}", format_budget(month, &reports));
    Ok(())
}

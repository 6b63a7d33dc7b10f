//! Forecast and budget queries
//!
//! Thin wrappers that run the pure report functions against the current
//! state under the read lock.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::ledger::Ledger;
use crate::error::SaveResult;
use crate::ledger::CategoryFilter;
use crate::models::{Money, YearMonth};
use crate::reports::{self, CategoryBudgetReport, ForecastPoint, ProjectionMode};
use crate::storage::LedgerStorage;

impl<S: LedgerStorage> Ledger<S> {
    /// Balance curve over `(as_of, horizon_end]` from actuals and projections
    pub fn forecast(
        &self,
        as_of: NaiveDate,
        horizon_end: NaiveDate,
        starting_balance: Money,
    ) -> SaveResult<Vec<ForecastPoint>> {
        let state = self.read()?;
        reports::forecast(&state.store, as_of, horizon_end, starting_balance)
    }

    /// Per-category spending against limits for one month
    pub fn evaluate_budget(
        &self,
        month: YearMonth,
        mode: ProjectionMode,
    ) -> SaveResult<Vec<CategoryBudgetReport>> {
        let state = self.read()?;
        reports::evaluate(&state.tree, &state.store, month, mode, self.base_currency())
    }

    /// Running balance over recorded transactions in `range`
    pub fn register(
        &self,
        range: RangeInclusive<NaiveDate>,
        filter: Option<&CategoryFilter>,
        opening: Money,
    ) -> SaveResult<Vec<ForecastPoint>> {
        let transactions = self.list_transactions(range, filter)?;
        reports::running_balance(transactions, opening)
    }
}

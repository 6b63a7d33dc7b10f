//! Reports over ledger snapshots
//!
//! Pure functions over a [`LedgerStore`](crate::ledger::LedgerStore) and
//! [`CategoryTree`](crate::ledger::CategoryTree): balance forecasts and
//! monthly budget evaluation.

pub mod budget;
pub mod forecast;

pub use budget::{evaluate, BudgetStatus, CategoryBudgetReport, ProjectionMode};
pub use forecast::{forecast, running_balance, ForecastPoint, ForecastSummary};

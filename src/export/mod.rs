//! Data export
//!
//! - CSV: transactions, forecasts and budget evaluations
//! - JSON: the full ledger with every transaction version

pub mod csv;
pub mod json;

pub use self::csv::{export_budget_csv, export_forecast_csv, export_transactions_csv};
pub use json::{export_full_json, read_export, ExportMetadata, FullExport, EXPORT_SCHEMA_VERSION};

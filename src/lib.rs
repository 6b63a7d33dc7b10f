//! iSaveMoney - ledger and budget projection engine
//!
//! This library keeps an append-only ledger of categorized transactions,
//! expands recurring templates into projected cash flows, and answers two
//! questions about the result: where the balance is heading, and how each
//! category's monthly spending compares with its limit.
//!
//! # Architecture
//!
//! - `models`: money, identifiers, categories, transactions, templates
//! - `ledger`: the category tree, the transaction store and recurrence
//!   expansion
//! - `reports`: forecast and budget evaluation over a ledger
//! - `services`: the [`services::Ledger`] command/query facade
//! - `storage`: the persistence boundary with JSON and in-memory backends
//! - `audit`: append-only log of committed commands
//! - `config`: paths and user settings
//! - `display`, `export`, `cli`: text output, CSV/JSON export and the
//!   `isave` command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use isavemoney::config::{SavePaths, Settings};
//! use isavemoney::services::Ledger;
//! use isavemoney::storage::JsonStorage;
//!
//! let paths = SavePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let ledger = Ledger::open(JsonStorage::new(paths)?, settings.base_currency)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SaveError, SaveResult};

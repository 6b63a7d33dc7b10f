//! Ledger engine
//!
//! In-memory structures that hold the ledger state and enforce its
//! invariants: the category hierarchy, the versioned transaction store and
//! the recurrence expansion engine.

pub mod category_tree;
pub mod recurrence;
pub mod store;

pub use category_tree::CategoryTree;
pub use recurrence::{expand, next_occurrence, project, Occurrences};
pub use store::{Amendment, CategoryFilter, LedgerStore};

//! Display formatting for terminal output
//!
//! Plain-text tables and trees for the CLI.

pub mod category;
pub mod report;
pub mod template;
pub mod transaction;

pub use category::{format_category_details, format_category_tree};
pub use report::{format_budget, format_forecast};
pub use template::format_template_list;
pub use transaction::{format_transaction_details, format_transaction_history, format_transaction_register};

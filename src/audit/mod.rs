//! Audit logging
//!
//! Every successful ledger command appends an [`AuditEntry`] with the
//! affected record's state before and after, and a summary of the changed
//! fields, to an append-only JSON-lines file.
//!
//! # Example
//!
//! ```rust,ignore
//! use isavemoney::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(
//!     EntityType::Category,
//!     category.id.to_string(),
//!     Some(category.name.clone()),
//!     &category,
//! ))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::diff_summary;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;

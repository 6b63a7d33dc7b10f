//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::diff_summary;

/// Kinds of command recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    /// A transaction version was superseded by a successor
    Amend,
    Archive,
    /// Template occurrences were converted into actual transactions
    Materialize,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Amend => write!(f, "AMEND"),
            Operation::Archive => write!(f, "ARCHIVE"),
            Operation::Materialize => write!(f, "MATERIALIZE"),
        }
    }
}

/// Kinds of record that commands touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Category,
    Transaction,
    RecurrenceTemplate,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Category => write!(f, "Category"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::RecurrenceTemplate => write!(f, "RecurrenceTemplate"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the command was applied (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Human-readable label (category name, transaction note)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name: entity_name.filter(|n| !n.is_empty()),
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    /// A new record was created
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::new(Operation::Create, entity_type, entity_id, entity_name);
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// A record changed in place (categories and templates)
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        Self::new(Operation::Update, entity_type, entity_id, entity_name).with_states(before, after)
    }

    /// A category was archived
    pub fn archive<T: Serialize>(
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        Self::new(Operation::Archive, EntityType::Category, entity_id, entity_name)
            .with_states(before, after)
    }

    /// A transaction version was replaced by `successor`
    ///
    /// The entry is keyed by the logical transaction (the chain origin).
    pub fn amend<T: Serialize>(
        origin_id: impl Into<String>,
        entity_name: Option<String>,
        replaced: &T,
        successor: &T,
    ) -> Self {
        Self::new(Operation::Amend, EntityType::Transaction, origin_id, entity_name)
            .with_states(replaced, successor)
    }

    /// Occurrences of a template were materialized
    pub fn materialize<T: Serialize>(
        template_id: impl Into<String>,
        entity_name: Option<String>,
        template: &T,
        summary: String,
    ) -> Self {
        let mut entry = Self::new(
            Operation::Materialize,
            EntityType::RecurrenceTemplate,
            template_id,
            entity_name,
        );
        entry.after = serde_json::to_value(template).ok();
        entry.diff_summary = Some(summary);
        entry
    }

    fn with_states<T: Serialize>(mut self, before: &T, after: &T) -> Self {
        self.before = serde_json::to_value(before).ok();
        self.after = serde_json::to_value(after).ok();
        if let (Some(before), Some(after)) = (&self.before, &self.after) {
            self.diff_summary = diff_summary(before, after);
        }
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Amend.to_string(), "AMEND");
        assert_eq!(Operation::Materialize.to_string(), "MATERIALIZE");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"name": "Groceries"});
        let entry = AuditEntry::create(
            EntityType::Category,
            "cat-12345678",
            Some("Groceries".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(data));
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_amend_entry_has_diff() {
        let replaced = json!({"id": "txn-a", "amount": {"minor_units": -5000}, "note": "Lunch"});
        let successor = json!({"id": "txn-b", "amount": {"minor_units": -4500}, "note": "Lunch"});
        let entry = AuditEntry::amend("txn-a", Some("Lunch".into()), &replaced, &successor);

        assert_eq!(entry.operation, Operation::Amend);
        assert_eq!(entry.entity_type, EntityType::Transaction);
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("amount.minor_units: -5000 -> -4500")
        );
    }

    #[test]
    fn test_empty_name_dropped() {
        let entry = AuditEntry::create(EntityType::Transaction, "txn-1", Some(String::new()), &json!({}));
        assert!(entry.entity_name.is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::archive(
            "cat-12345678",
            Some("Travel".to_string()),
            &json!({"archived": false}),
            &json!({"archived": true}),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("ARCHIVE"));
        assert!(formatted.contains("Category"));
        assert!(formatted.contains("(Travel)"));
        assert!(formatted.contains("archived: false -> true"));
    }
}

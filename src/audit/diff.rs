//! Diff generation for audit logging
//!
//! Compares the JSON form of a record before and after a command and
//! describes the changed fields, using dotted paths for nested values.

use serde_json::Value;

/// Bookkeeping fields that change on every write and say nothing useful
const IGNORED_FIELDS: &[&str] = &["id", "seq", "version", "voided", "amends", "created_at", "updated_at"];

/// Summarize field changes between two JSON values, if any
pub fn diff_summary(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, "", &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect_changes(before: &Value, after: &Value, prefix: &str, changes: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, before_val) in before_obj {
                if prefix.is_empty() && IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let path = field_path(prefix, key);
                match after_obj.get(key) {
                    Some(after_val) => collect_changes(before_val, after_val, &path, changes),
                    None => changes.push(format!("{}: {} -> (removed)", path, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if before_obj.contains_key(key)
                    || (prefix.is_empty() && IGNORED_FIELDS.contains(&key.as_str()))
                {
                    continue;
                }
                changes.push(format!(
                    "{}: (added) -> {}",
                    field_path(prefix, key),
                    format_value(after_val)
                ));
            }
        }
        _ if before != after => {
            let label = if prefix.is_empty() { "value" } else { prefix };
            changes.push(format!(
                "{}: {} -> {}",
                label,
                format_value(before),
                format_value(after)
            ));
        }
        _ => {}
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_changes() {
        let value = json!({"name": "Food", "archived": false});
        assert_eq!(diff_summary(&value, &value), None);
    }

    #[test]
    fn test_changed_added_removed() {
        let before = json!({"name": "Food", "note": "weekly"});
        let after = json!({"name": "Groceries", "parent_id": "cat-1"});
        let diff = diff_summary(&before, &after).unwrap();

        assert!(diff.contains("name: \"Food\" -> \"Groceries\""));
        assert!(diff.contains("note: \"weekly\" -> (removed)"));
        assert!(diff.contains("parent_id: (added) -> \"cat-1\""));
    }

    #[test]
    fn test_nested_paths() {
        let before = json!({"monthly_limit": {"minor_units": 10000, "currency": "USD"}});
        let after = json!({"monthly_limit": {"minor_units": 12500, "currency": "USD"}});
        assert_eq!(
            diff_summary(&before, &after).as_deref(),
            Some("monthly_limit.minor_units: 10000 -> 12500")
        );
    }

    #[test]
    fn test_bookkeeping_fields_ignored() {
        let before = json!({"id": "txn-a", "version": 1, "updated_at": "t1", "note": "x"});
        let after = json!({"id": "txn-b", "version": 2, "updated_at": "t2", "note": "x"});
        assert_eq!(diff_summary(&before, &after), None);
    }

    #[test]
    fn test_long_strings_truncated() {
        let long = "x".repeat(80);
        let diff = diff_summary(&json!({"note": ""}), &json!({"note": long})).unwrap();
        assert!(diff.ends_with("...\""));
    }
}

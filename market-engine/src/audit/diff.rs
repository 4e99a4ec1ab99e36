//! JSON diff for change records
//!
//! Compares before/after JSON snapshots field by field. Nested objects are
//! walked recursively; arrays compare as a whole.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// One changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Dotted path for nested fields
    pub field: String,
    pub from: Value,
    pub to: Value,
}

/// Fields never written into a snapshot
fn excluded_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        // client_secret belongs to the buyer's browser only
        "payment" => &["client_secret"],
        _ => &[],
    }
}

// ============================================================================
// JSON diff
// ============================================================================

fn diff_json_recursive(from: &Value, to: &Value, path: &str, changes: &mut Vec<FieldChange>) {
    match (from, to) {
        // both objects: recurse in key order
        (Value::Object(from_obj), Value::Object(to_obj)) => {
            let all_keys: BTreeSet<&String> = from_obj.keys().chain(to_obj.keys()).collect();

            for key in all_keys {
                let field_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                let f = from_obj.get(key).unwrap_or(&Value::Null);
                let t = to_obj.get(key).unwrap_or(&Value::Null);
                diff_json_recursive(f, t, &field_path, changes);
            }
        }

        // anything else, arrays included: compare whole
        (f, t) => {
            if f != t {
                changes.push(FieldChange {
                    field: path.to_string(),
                    from: f.clone(),
                    to: t.clone(),
                });
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Serialize into an audit snapshot, dropping the resource type's excluded fields
pub fn snapshot<T: Serialize>(value: &T, resource_type: &str) -> Value {
    match serde_json::to_value(value) {
        Ok(mut json) => {
            if let Value::Object(obj) = &mut json {
                for field in excluded_fields(resource_type) {
                    obj.remove(*field);
                }
            }
            json
        }
        Err(e) => {
            tracing::error!(resource_type = %resource_type, "Failed to serialize audit snapshot: {:?}", e);
            json!({"error": "serialization_failed"})
        }
    }
}

/// Field-level diff of two snapshots, ordered by field path
pub fn diff_values(from: &Value, to: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    diff_json_recursive(from, to, "", &mut changes);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestIntent {
        id: String,
        status: String,
        client_secret: String,
        amount_cents: i64,
    }

    #[test]
    fn test_snapshot_filters_sensitive_fields() {
        let intent = TestIntent {
            id: "pay_1".into(),
            status: "pending".into(),
            client_secret: "pi_1_secret_x".into(),
            amount_cents: 4800,
        };

        let payment = snapshot(&intent, "payment");
        assert!(payment.get("client_secret").is_none());
        assert_eq!(payment["amount_cents"], 4800);

        let other = snapshot(&intent, "order");
        assert!(other.get("client_secret").is_some());
    }

    #[test]
    fn test_diff_nested_and_sorted() {
        let from = json!({
            "status": "pending",
            "shipment": {"status": "packed", "timeline": [1]},
            "total_cents": 4800
        });
        let to = json!({
            "status": "paid",
            "shipment": {"status": "shipped", "timeline": [1, 2]},
            "total_cents": 4800,
            "shipped_at": 7
        });

        let changes = diff_values(&from, &to);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "shipment.status",
                "shipment.timeline",
                "shipped_at",
                "status"
            ]
        );
        assert_eq!(changes[2].from, Value::Null);
    }

    #[test]
    fn test_diff_no_changes() {
        let value = json!({"a": 1, "b": [1, 2]});
        assert!(diff_values(&value, &value).is_empty());
    }

    #[test]
    fn test_diff_scalar_root() {
        let changes = diff_values(&Value::Null, &json!("x"));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "");
    }
}

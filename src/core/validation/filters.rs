//! Payload filtering after validation
//!
//! Handlers persist only what their rule table names; anything else the
//! client sent is dropped here.

use serde_json::{Map, Value};

use super::rules::RuleSet;

/// Keep the top-level keys covered by `rules`
///
/// A dotted rule (`credentials.key`) keeps its whole root object.
pub fn only_validated(payload: &Value, rules: &RuleSet) -> Map<String, Value> {
    let mut filtered = Map::new();
    let Some(object) = payload.as_object() else {
        return filtered;
    };

    for field in rules.fields() {
        let root = field.split('.').next().unwrap_or(field);
        if filtered.contains_key(root) {
            continue;
        }
        if let Some(value) = object.get(root) {
            filtered.insert(root.to_string(), value.clone());
        }
    }

    filtered
}

/// Stringify scalars for the settings store, which only keeps strings
pub fn setting_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::rules::Constraint;
    use serde_json::json;

    #[test]
    fn test_only_validated_drops_unknown_keys() {
        let rules = RuleSet::new()
            .field("from_name", &[Constraint::Required])
            .field("from_mail", &[Constraint::Required]);

        let filtered = only_validated(
            &json!({ "from_name": "Crane", "from_mail": "a@b.c", "is_admin": true }),
            &rules,
        );

        assert_eq!(filtered.len(), 2);
        assert!(!filtered.contains_key("is_admin"));
    }

    #[test]
    fn test_only_validated_keeps_nested_root_once() {
        let rules = RuleSet::new()
            .field("credentials.key", &[Constraint::Required])
            .field("credentials.secret", &[Constraint::Required]);

        let filtered = only_validated(
            &json!({ "credentials": { "key": "k", "secret": "s", "extra": 1 } }),
            &rules,
        );

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered["credentials"]["extra"], json!(1));
    }

    #[test]
    fn test_only_validated_on_non_object() {
        let rules = RuleSet::new().field("name", &[Constraint::Required]);
        assert!(only_validated(&json!([1, 2]), &rules).is_empty());
    }

    #[test]
    fn test_setting_value() {
        assert_eq!(setting_value(&json!("587")), "587");
        assert_eq!(setting_value(&json!(587)), "587");
        assert_eq!(setting_value(&json!(true)), "true");
        assert_eq!(setting_value(&json!(null)), "");
    }
}

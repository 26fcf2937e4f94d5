//! Ordered rule tables
//!
//! A [`RuleSet`] maps field names to the constraints applied to them, in
//! declaration order. Field names may be dotted (`credentials.key`) to reach
//! into nested objects.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::validators;
use crate::core::error::ValidationError;

/// A single rule applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    /// Absent or null values skip the remaining constraints
    Nullable,
    String,
    Numeric,
    Url,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Nullable => "nullable",
            Constraint::String => "string",
            Constraint::Numeric => "numeric",
            Constraint::Url => "url",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered `field -> constraints` table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet(IndexMap<String, Vec<Constraint>>);

impl RuleSet {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert; re-adding a field replaces its constraints in place
    pub fn field(mut self, name: &str, constraints: &[Constraint]) -> Self {
        self.0.insert(name.to_string(), constraints.to_vec());
        self
    }

    /// Append every rule of `other`
    pub fn merge(mut self, other: RuleSet) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, field: &str) -> Option<&[Constraint]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a JSON payload, collecting the first failure of every field
    pub fn validate(&self, payload: &Value) -> Result<(), ValidationError> {
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();

        for (field, constraints) in &self.0 {
            if let Err(message) = check_field(field, constraints, lookup(payload, field)) {
                errors.entry(field.clone()).or_default().push(message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}

/// Resolve a dotted path inside a JSON object
pub fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(payload, |current, segment| current.get(segment))
}

fn check_field(field: &str, constraints: &[Constraint], value: Option<&Value>) -> Result<(), String> {
    if constraints.contains(&Constraint::Required) {
        validators::required(field, value)?;
    }

    // Optional fields that were not sent are not type-checked
    let value = match value {
        Some(Value::Null) | None => return Ok(()),
        Some(value) => value,
    };

    for constraint in constraints {
        match constraint {
            Constraint::Required | Constraint::Nullable => {}
            Constraint::String => validators::string(field, value)?,
            Constraint::Numeric => validators::numeric(field, value)?,
            Constraint::Url => validators::url(field, value)?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Constraint::*;
    use serde_json::json;

    #[test]
    fn test_rules_keep_declaration_order() {
        let rules = RuleSet::new()
            .field("b", &[Required])
            .field("a", &[Required, String])
            .field("c", &[Nullable, String]);

        let fields: Vec<&str> = rules.fields().collect();
        assert_eq!(fields, vec!["b", "a", "c"]);
        assert_eq!(rules.get("a"), Some(&[Required, String][..]));
    }

    #[test]
    fn test_rules_serialize_as_ordered_map() {
        let rules = RuleSet::new()
            .field("mail_port", &[Required])
            .field("mail_encryption", &[Nullable, String]);

        assert_eq!(
            serde_json::to_string(&rules).unwrap(),
            r#"{"mail_port":["required"],"mail_encryption":["nullable","string"]}"#
        );
    }

    #[test]
    fn test_validate_collects_errors_per_field() {
        let rules = RuleSet::new()
            .field("name", &[Required])
            .field("credentials.key", &[Required, String])
            .field("database_port", &[Required, Numeric]);

        let err = rules
            .validate(&json!({ "credentials": { "key": 7 }, "database_port": "abc" }))
            .unwrap_err();

        match err {
            ValidationError::FieldErrors(errors) => {
                let fields: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
                assert_eq!(fields, vec!["name", "credentials.key", "database_port"]);
                assert_eq!(errors["credentials.key"], vec!["The credentials.key must be a string."]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_nullable_accepts_null_and_absent() {
        let rules = RuleSet::new().field("mail_encryption", &[Nullable, String]);

        assert!(rules.validate(&json!({})).is_ok());
        assert!(rules.validate(&json!({ "mail_encryption": null })).is_ok());
        assert!(rules.validate(&json!({ "mail_encryption": "tls" })).is_ok());
        assert!(rules.validate(&json!({ "mail_encryption": 1 })).is_err());
    }

    #[test]
    fn test_empty_rules_accept_anything() {
        assert!(RuleSet::new().validate(&json!({ "anything": 1 })).is_ok());
        assert!(RuleSet::new().validate(&json!(null)).is_ok());
    }

    #[test]
    fn test_lookup_nested() {
        let payload = json!({ "credentials": { "bucket": "invoices" } });
        assert_eq!(lookup(&payload, "credentials.bucket"), Some(&json!("invoices")));
        assert_eq!(lookup(&payload, "credentials.root"), None);
        assert_eq!(lookup(&payload, "name"), None);
    }
}

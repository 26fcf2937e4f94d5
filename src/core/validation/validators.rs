//! Field checks behind each [`Constraint`](super::Constraint)
//!
//! Every check receives the field name and the value found in the payload
//! (`None` when the key is absent) and returns the message to report.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Human label of a field, `mail_host` -> `mail host`
pub fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

/// True when the value counts as "not provided"
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

pub fn required(field: &str, value: Option<&Value>) -> Result<(), String> {
    if is_blank(value) {
        Err(format!("The {} field is required.", attribute(field)))
    } else {
        Ok(())
    }
}

pub fn string(field: &str, value: &Value) -> Result<(), String> {
    if value.is_string() {
        Ok(())
    } else {
        Err(format!("The {} must be a string.", attribute(field)))
    }
}

/// Numbers and numeric strings both pass
pub fn numeric(field: &str, value: &Value) -> Result<(), String> {
    let ok = match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(format!("The {} must be a number.", attribute(field)))
    }
}

pub fn url(field: &str, value: &Value) -> Result<(), String> {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| {
        Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern is a valid regex")
    });

    match value.as_str() {
        Some(s) if regex.is_match(s) => Ok(()),
        _ => Err(format!("The {} format is invalid.", attribute(field))),
    }
}

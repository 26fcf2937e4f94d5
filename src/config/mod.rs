//! Configuration loading and dotted-key access
//!
//! The configuration is a YAML tree. Handlers read it through dotted keys
//! such as `services.cron_job.auth_token` or `mail.from.address`.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environment variable overriding `services.cron_job.auth_token`
pub const CRON_TOKEN_ENV: &str = "CRON_JOB_AUTH_TOKEN";

/// Application configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppConfig {
    values: Value,
}

/// Sender identity used by outgoing mail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailFrom {
    pub from_name: Option<String>,
    pub from_mail: Option<String>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let values: Value = serde_yaml::from_str(yaml)?;
        match values {
            Value::Object(_) => Ok(Self { values }),
            Value::Null => Ok(Self {
                values: Value::Object(Map::new()),
            }),
            other => Err(anyhow!(
                "configuration root must be a mapping, found {}",
                kind(&other)
            )),
        }
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(CRON_TOKEN_ENV) {
            self.set("services.cron_job.auth_token", Value::String(token));
        }
        self
    }

    /// Value at a dotted key
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.values, |current, segment| current.get(segment))
    }

    /// String value at a dotted key; null and non-strings are `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Set a dotted key, creating intermediate mappings
    pub fn set(&mut self, key: &str, value: Value) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.values;
        for segment in segments {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let Value::Object(map) = current else {
                return;
            };
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        if let Value::Object(map) = current {
            map.insert(last.to_string(), value);
        }
    }

    /// Shared secret of the cron endpoint; empty counts as unset
    pub fn cron_auth_token(&self) -> Option<&str> {
        self.get_str("services.cron_job.auth_token")
            .filter(|token| !token.is_empty())
    }

    pub fn mail_from(&self) -> MailFrom {
        MailFrom {
            from_name: self.get_str("mail.from.name").map(str::to_string),
            from_mail: self.get_str("mail.from.address").map(str::to_string),
        }
    }

    /// Disks the backup job writes to
    pub fn backup_disks(&self) -> Vec<String> {
        match self.get("backup.backup.destination.disks") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(disk)) => vec![disk.clone()],
            _ => Vec::new(),
        }
    }

    /// Default filesystem disk
    pub fn default_disk(&self) -> &str {
        self.get_str("filesystems.default").unwrap_or("local")
    }

    /// Root of the local disk
    pub fn local_disk_root(&self) -> &str {
        self.get_str("filesystems.disks.local.root")
            .unwrap_or("storage/app")
    }

    /// Directory holding the sqlite database file
    pub fn database_path(&self) -> &str {
        self.get_str("database.path").unwrap_or("database")
    }

    /// Create a default configuration for development and tests
    pub fn default_config() -> Self {
        let mut config = Self {
            values: Value::Object(Map::new()),
        };
        config.set("app.name", Value::String("invoicer".to_string()));
        config.set("services.cron_job.auth_token", Value::String(String::new()));
        config.set("mail.from.name", Value::String("Invoicer".to_string()));
        config.set(
            "mail.from.address",
            Value::String("hello@invoicer.test".to_string()),
        );
        config.set(
            "backup.backup.destination.disks",
            Value::Array(vec![Value::String("local".to_string())]),
        );
        config.set("filesystems.default", Value::String("local".to_string()));
        config.set(
            "filesystems.disks.local.root",
            Value::String("storage/app".to_string()),
        );
        config.set("database.path", Value::String("database".to_string()));
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = r#"
services:
  cron_job:
    auth_token: s3cret
mail:
  from:
    name: Crane Billing
    address: billing@crane.test
backup:
  backup:
    destination:
      disks:
        - local
        - s3
"#;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_config();

        assert_eq!(config.get_str("app.name"), Some("invoicer"));
        assert_eq!(config.cron_auth_token(), None);
        assert_eq!(config.backup_disks(), vec!["local".to_string()]);
        assert_eq!(config.default_disk(), "local");
    }

    #[test]
    fn test_dotted_lookup() {
        let config = AppConfig::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.cron_auth_token(), Some("s3cret"));
        assert_eq!(config.get("mail.from"), Some(&json!({
            "name": "Crane Billing",
            "address": "billing@crane.test"
        })));
        assert_eq!(config.get("mail.from.reply_to"), None);
        assert_eq!(config.get_str("backup.backup"), None);
    }

    #[test]
    fn test_mail_from() {
        let config = AppConfig::from_yaml_str(SAMPLE).unwrap();
        let from = config.mail_from();
        assert_eq!(from.from_name.as_deref(), Some("Crane Billing"));
        assert_eq!(from.from_mail.as_deref(), Some("billing@crane.test"));

        let empty = AppConfig::from_yaml_str("").unwrap().mail_from();
        assert_eq!(empty.from_name, None);
        assert_eq!(empty.from_mail, None);
    }

    #[test]
    fn test_backup_disks_accepts_single_string() {
        let config =
            AppConfig::from_yaml_str("backup:\n  backup:\n    destination:\n      disks: s3\n")
                .unwrap();
        assert_eq!(config.backup_disks(), vec!["s3".to_string()]);
    }

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut config = AppConfig::from_yaml_str("services: disabled").unwrap();
        config.set("services.cron_job.auth_token", json!("abc"));
        assert_eq!(config.cron_auth_token(), Some("abc"));
    }

    #[test]
    fn test_overrides_replace_cron_token() {
        let config = AppConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .with_overrides(|key| (key == CRON_TOKEN_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.cron_auth_token(), Some("from-env"));

        let untouched = AppConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .with_overrides(|_| None);
        assert_eq!(untouched.cron_auth_token(), Some("s3cret"));
    }

    #[test]
    fn test_empty_token_counts_as_unset() {
        let config =
            AppConfig::from_yaml_str("services:\n  cron_job:\n    auth_token: ''\n").unwrap();
        assert_eq!(config.cron_auth_token(), None);
    }

    #[test]
    fn test_root_must_be_mapping() {
        assert!(AppConfig::from_yaml_str("- a\n- b\n").is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = AppConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.backup_disks(), vec!["local".to_string(), "s3".to_string()]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::from_yaml_file("/nonexistent/invoicer.yaml").is_err());
    }
}

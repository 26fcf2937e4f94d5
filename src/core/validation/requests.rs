//! Form requests whose rule table depends on a discriminator field
//!
//! The mail, disk and database environment forms each switch on one input
//! (`mail_driver`, `driver`, `database_connection`). Authorization is left to
//! the handlers, so `authorize` is always true here.

use serde_json::Value;

use super::rules::{Constraint::*, RuleSet};
use crate::entities::file_disk::credential_fields;

/// A request body with a rule table chosen from its own content
pub trait FormRequest: Send + Sync + 'static {
    /// Rules for this payload
    fn rules(payload: &Value) -> RuleSet;

    fn authorize() -> bool {
        true
    }
}

fn discriminator<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

// =============================================================================
// Mail environment
// =============================================================================

/// `POST /mail/config`
pub struct MailEnvironmentRequest;

impl FormRequest for MailEnvironmentRequest {
    fn rules(payload: &Value) -> RuleSet {
        mail_rules(discriminator(payload, "mail_driver"))
    }
}

fn sender_rules() -> RuleSet {
    RuleSet::new()
        .field("from_name", &[Required, String])
        .field("from_mail", &[Required, String])
}

/// Rules per mail driver; unknown, missing or empty drivers get no rules
pub fn mail_rules(driver: Option<&str>) -> RuleSet {
    match driver.unwrap_or_default() {
        "smtp" => RuleSet::new()
            .field("mail_driver", &[Required, String])
            .field("mail_host", &[Required, String])
            .field("mail_port", &[Required])
            .field("mail_encryption", &[Required, String])
            .merge(sender_rules()),
        "mailgun" => RuleSet::new()
            .field("mail_driver", &[Required, String])
            .field("mail_mailgun_domain", &[Required, String])
            .field("mail_mailgun_secret", &[Required, String])
            .field("mail_mailgun_endpoint", &[Required, String])
            .merge(sender_rules()),
        "ses" => RuleSet::new()
            .field("mail_driver", &[Required, String])
            .field("mail_host", &[Required, String])
            .field("mail_port", &[Required])
            .field("mail_ses_key", &[Required, String])
            .field("mail_ses_secret", &[Required, String])
            .field("mail_encryption", &[Nullable, String])
            .merge(sender_rules()),
        "mail" | "sendmail" => sender_rules(),
        _ => RuleSet::new(),
    }
}

// =============================================================================
// Settings
// =============================================================================

/// `POST /settings` and `POST /company/settings`
pub struct SettingsRequest;

impl FormRequest for SettingsRequest {
    fn rules(_payload: &Value) -> RuleSet {
        RuleSet::new().field("settings", &[Required])
    }
}

// =============================================================================
// Disk environment
// =============================================================================

/// `POST /disks`
pub struct DiskEnvironmentRequest;

impl FormRequest for DiskEnvironmentRequest {
    fn rules(payload: &Value) -> RuleSet {
        disk_rules(discriminator(payload, "driver"))
    }
}

/// Base rules plus the credentials the driver needs
pub fn disk_rules(driver: Option<&str>) -> RuleSet {
    let base = RuleSet::new()
        .field("name", &[Required])
        .field("driver", &[Required]);

    credential_fields(driver.unwrap_or_default())
        .iter()
        .fold(base, |rules, name| {
            rules.field(&format!("credentials.{}", name), &[Required, String])
        })
}

// =============================================================================
// Database environment
// =============================================================================

/// `POST /installation/database/config`
pub struct DatabaseEnvironmentRequest;

impl FormRequest for DatabaseEnvironmentRequest {
    fn rules(payload: &Value) -> RuleSet {
        database_rules(discriminator(payload, "database_connection"))
    }
}

/// sqlite needs only a file name; every other connection needs a server
pub fn database_rules(connection: Option<&str>) -> RuleSet {
    match connection {
        Some("sqlite") => RuleSet::new()
            .field("app_url", &[Required, Url])
            .field("database_connection", &[Required, String])
            .field("database_name", &[Required, String]),
        _ => RuleSet::new()
            .field("app_url", &[Required, Url])
            .field("database_connection", &[Required, String])
            .field("database_hostname", &[Required, String])
            .field("database_port", &[Required, Numeric])
            .field("database_name", &[Required, String])
            .field("database_username", &[Required, String]),
    }
}

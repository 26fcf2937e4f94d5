//! Mail configuration, gated by `manage email config`

use axum::Json;
use axum::extract::State;
use serde_json::{Map, Value, json};

use crate::core::auth::CurrentUser;
use crate::core::error::AppResult;
use crate::core::settings::Scope;
use crate::core::validation::filters::setting_value;
use crate::core::validation::{MailEnvironmentRequest, Validated};
use crate::server::state::AppState;

const ABILITY: &str = "manage email config";

pub const MAIL_DRIVERS: &[&str] = &["smtp", "mail", "sendmail", "mailgun", "ses"];

/// Keys returned by the configuration endpoint, in response order
pub const MAIL_KEYS: &[&str] = &[
    "mail_driver",
    "mail_host",
    "mail_port",
    "mail_username",
    "mail_password",
    "mail_encryption",
    "from_name",
    "from_mail",
    "mail_mailgun_endpoint",
    "mail_mailgun_domain",
    "mail_mailgun_secret",
    "mail_ses_key",
    "mail_ses_secret",
];

pub async fn mail_drivers(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    state.gate.authorize(current.require()?, ABILITY)?;
    Ok(Json(json!(MAIL_DRIVERS)))
}

/// Every mail key, `null` when never saved
pub async fn get_mail_config(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    state.gate.authorize(current.require()?, ABILITY)?;

    let mut saved = state.settings.get_settings(MAIL_KEYS, Scope::Global).await?;
    let config: Map<String, Value> = MAIL_KEYS
        .iter()
        .map(|key| {
            let value = saved.shift_remove(*key).map_or(Value::Null, Value::String);
            (key.to_string(), value)
        })
        .collect();

    Ok(Json(Value::Object(config)))
}

/// Persist the fields the driver's rules name
///
/// Saving mail settings is step 4 of the onboarding wizard, so an
/// unfinished profile moves to that step.
pub async fn save_mail_config(
    State(state): State<AppState>,
    current: CurrentUser,
    Validated(payload, _): Validated<MailEnvironmentRequest>,
) -> AppResult<Json<Value>> {
    state.gate.authorize(current.require()?, ABILITY)?;

    let settings = payload
        .iter()
        .map(|(key, value)| (key.clone(), setting_value(value)))
        .collect();
    state.settings.set_settings(&settings, Scope::Global).await?;

    let profile = state
        .settings
        .get_setting("profile_complete", Scope::Global)
        .await?;
    if profile.as_deref() != Some("COMPLETED") {
        state
            .settings
            .set_setting("profile_complete", "4", Scope::Global)
            .await?;
    }

    tracing::info!(driver = ?payload.get("mail_driver"), "mail configuration saved");
    Ok(Json(json!({ "success": true, "message": "Mail variables saved" })))
}

/// Sender identity from the application config
pub async fn get_company_mail_config(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    current.require()?;

    let from = state.config.mail_from();
    Ok(Json(json!({
        "from_name": from.from_name,
        "from_mail": from.from_mail,
    })))
}

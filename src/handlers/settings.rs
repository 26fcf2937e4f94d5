//! Global and company settings

use axum::Json;
use axum::extract::{Query, State};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::core::auth::CurrentUser;
use crate::core::error::{AppResult, RequestError, ValidationError};
use crate::core::extractors::CompanyScope;
use crate::core::settings::Scope;
use crate::core::validation::filters::setting_value;
use crate::core::validation::{SettingsRequest, Validated};
use crate::entities::CompanyId;
use crate::server::state::AppState;

const MANAGE_SETTINGS: &str = "manage settings";
const MANAGE_COMPANY: &str = "manage company";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingQuery {
    pub key: String,
}

/// Comma separated setting keys, e.g. `?settings=currency,time_zone`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsQuery {
    pub settings: String,
}

impl SettingsQuery {
    pub fn keys(&self) -> Vec<&str> {
        self.settings
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect()
    }
}

/// `{"settings": {...}}` flattened to string values
fn settings_map(payload: &Map<String, Value>) -> IndexMap<String, String> {
    payload
        .get("settings")
        .and_then(Value::as_object)
        .map(|settings| {
            settings
                .iter()
                .map(|(key, value)| (key.clone(), setting_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Global settings
// =============================================================================

/// `{<key>: value}`, `null` when unset
pub async fn get_setting(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<SettingQuery>,
) -> AppResult<Json<Value>> {
    state.gate.authorize(current.require()?, MANAGE_SETTINGS)?;

    if query.key.trim().is_empty() {
        return Err(ValidationError::field("key", "The key field is required.").into());
    }

    let value = state.settings.get_setting(&query.key, Scope::Global).await?;
    let mut body = Map::new();
    body.insert(query.key, value.map_or(Value::Null, Value::String));
    Ok(Json(Value::Object(body)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    Validated(payload, _): Validated<SettingsRequest>,
) -> AppResult<Json<Value>> {
    state.gate.authorize(current.require()?, MANAGE_SETTINGS)?;

    let settings = settings_map(&payload);
    state.settings.set_settings(&settings, Scope::Global).await?;
    tracing::info!(count = settings.len(), "global settings updated");

    Ok(Json(json!({ "success": true, "settings": settings })))
}

// =============================================================================
// Company settings
// =============================================================================

async fn authorize_company(
    state: &AppState,
    current: &CurrentUser,
    company_id: CompanyId,
) -> AppResult<()> {
    let user = current.require()?;
    if state.companies.find_company(company_id).await?.is_none() {
        return Err(RequestError::NotFound {
            resource: "company".to_string(),
            id: company_id.to_string(),
        }
        .into());
    }
    state.gate.authorize(user, MANAGE_COMPANY)?;
    Ok(())
}

/// Only the requested keys that exist, in request order
pub async fn get_company_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    CompanyScope(company_id): CompanyScope,
    Query(query): Query<SettingsQuery>,
) -> AppResult<Json<IndexMap<String, String>>> {
    authorize_company(&state, &current, company_id).await?;

    let settings = state
        .settings
        .get_settings(&query.keys(), Scope::Company(company_id))
        .await?;
    Ok(Json(settings))
}

/// The company currency is frozen once transactions exist
pub async fn update_company_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    CompanyScope(company_id): CompanyScope,
    Validated(payload, _): Validated<SettingsRequest>,
) -> AppResult<Json<Value>> {
    authorize_company(&state, &current, company_id).await?;

    let settings = settings_map(&payload);
    let scope = Scope::Company(company_id);

    if let Some(currency) = settings.get("currency") {
        let current_currency = state.settings.get_setting("currency", scope).await?;
        if current_currency.as_deref() != Some(currency.as_str())
            && state.companies.has_transactions(company_id).await?
        {
            return Ok(Json(json!({
                "success": false,
                "message": "Cannot update company currency after transactions are created."
            })));
        }
    }

    state.settings.set_settings(&settings, scope).await?;
    tracing::info!(company_id, count = settings.len(), "company settings updated");

    Ok(Json(json!({ "success": true })))
}

pub async fn has_transactions(
    State(state): State<AppState>,
    current: CurrentUser,
    CompanyScope(company_id): CompanyScope,
) -> AppResult<Json<Value>> {
    authorize_company(&state, &current, company_id).await?;

    let has_transactions = state.companies.has_transactions(company_id).await?;
    Ok(Json(json!({ "has_transactions": has_transactions })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_query_keys() {
        let query = SettingsQuery {
            settings: "currency, time_zone,,date_format".to_string(),
        };
        assert_eq!(query.keys(), vec!["currency", "time_zone", "date_format"]);
        assert!(SettingsQuery::default().keys().is_empty());
    }

    #[test]
    fn test_settings_map_stringifies_values() {
        let payload = json!({ "settings": { "currency": 3, "tax_per_item": "NO", "notes": null } });
        let map = settings_map(payload.as_object().unwrap());

        assert_eq!(map["currency"], "3");
        assert_eq!(map["tax_per_item"], "NO");
        assert_eq!(map["notes"], "");
    }
}

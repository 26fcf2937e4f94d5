//! File disk management, gated by `manage file disk`
//!
//! `{disk}` is a driver name for `GET` (the credential template of that
//! driver) and a disk id for `PUT` / `DELETE`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::respond_json;
use crate::core::auth::CurrentUser;
use crate::core::error::{AppResult, RequestError};
use crate::core::extractors::extract_company_id;
use crate::core::validation::{DiskEnvironmentRequest, FormRequest};
use crate::entities::file_disk::{DISK_DRIVERS, credential_fields};
use crate::entities::{FileDisk, NewFileDisk};
use crate::server::state::AppState;

const ABILITY: &str = "manage file disk";

fn authorize(state: &AppState, current: &CurrentUser) -> AppResult<()> {
    state.gate.authorize(current.require()?, ABILITY)?;
    Ok(())
}

fn invalid_credentials() -> Response {
    respond_json("invalid_credentials", "Invalid Credentials.")
}

fn disk_not_found(id: &str) -> RequestError {
    RequestError::NotFound {
        resource: "file disk".to_string(),
        id: id.to_string(),
    }
}

async fn find_disk(state: &AppState, id: &str) -> AppResult<FileDisk> {
    let parsed: u64 = id.parse().map_err(|_| disk_not_found(id))?;
    state
        .disks
        .find(parsed)
        .await?
        .ok_or_else(|| disk_not_found(id).into())
}

/// Fields a disk update may carry; anything absent is left alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiskUpdate {
    pub name: Option<String>,
    pub driver: Option<String>,
    pub credentials: Option<Map<String, Value>>,
    pub set_as_default: Option<bool>,
}

/// Every disk, latest first
pub async fn list_disks(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;

    let disks = state.disks.list().await?;
    Ok(Json(json!({ "data": disks })))
}

/// Validate rules, then let the store check the credentials themselves
pub async fn create_disk(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> AppResult<Response> {
    authorize(&state, &current)?;
    DiskEnvironmentRequest::rules(&payload).validate(&payload)?;

    let disk: NewFileDisk = serde_json::from_value(payload)?;
    if !state
        .disks
        .validate_credentials(&disk.credentials, &disk.driver)
        .await?
    {
        return Ok(invalid_credentials());
    }

    let created = state
        .disks
        .create(disk, extract_company_id(&headers))
        .await?;
    tracing::info!(disk_id = created.id, driver = %created.driver, "file disk created");

    Ok(Json(json!({ "data": created })).into_response())
}

/// Credential template of a driver
pub async fn show_disk(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(disk): Path<String>,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;

    let template = match disk.as_str() {
        "local" => json!({ "root": state.config.local_disk_root() }),
        driver => {
            let fields: Map<String, Value> = credential_fields(driver)
                .iter()
                .map(|field| (field.to_string(), Value::String(String::new())))
                .collect();
            Value::Object(fields)
        }
    };
    Ok(Json(template))
}

/// Re-check credentials of non-system disks, or switch the default disk
///
/// System disks never change credentials; they may only become default.
pub async fn update_disk(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(disk): Path<String>,
    Json(body): Json<DiskUpdate>,
) -> AppResult<Response> {
    authorize(&state, &current)?;
    let mut disk = find_disk(&state, &disk).await?;

    match (&body.credentials, &body.driver) {
        (Some(credentials), Some(driver)) if !disk.is_system() => {
            if !state.disks.validate_credentials(credentials, driver).await? {
                return Ok(invalid_credentials());
            }

            if let Some(name) = body.name {
                disk.name = name;
            }
            disk.driver = driver.clone();
            disk.credentials = credentials.clone();
            disk = state.disks.update(disk).await?;
            tracing::info!(disk_id = disk.id, "file disk updated");
        }
        _ if body.set_as_default == Some(true) => {
            state.disks.set_default(disk.id).await?;
            disk.set_as_default = true;
            tracing::info!(disk_id = disk.id, "default file disk changed");
        }
        _ => {}
    }

    Ok(Json(json!({ "data": disk })).into_response())
}

/// The default system disk cannot be removed
pub async fn delete_disk(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(disk): Path<String>,
) -> AppResult<Response> {
    authorize(&state, &current)?;
    let disk = find_disk(&state, &disk).await?;

    if disk.set_as_default && disk.is_system() {
        return Ok(respond_json("not_allowed", "Not Allowed"));
    }

    state.disks.delete(disk.id).await?;
    tracing::info!(disk_id = disk.id, "file disk deleted");
    Ok(Json(json!({ "success": true })).into_response())
}

pub async fn disk_drivers(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;

    let drivers: Vec<Value> = DISK_DRIVERS
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();
    Ok(Json(json!({
        "drivers": drivers,
        "default": state.config.default_disk(),
    })))
}

/// Disks the backup job is configured to write to
pub async fn backup_disks(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    Ok(Json(json!(state.config.backup_disks())))
}

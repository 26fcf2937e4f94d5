//! Application self-update workflow
//!
//! Only owners may drive an update. Anyone else, including anonymous
//! callers, gets the same 401 body before the input is even looked at.
//!
//! ```text
//! GET  /check/update      ask the updater for a newer release
//! POST /update/download   {version}
//! POST /update/unzip      {path}
//! POST /update/copy       {path}
//! POST /update/delete     {deleted_files}
//! POST /update/migrate
//! POST /update/finish     {installed, version}
//! ```

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::core::auth::CurrentUser;
use crate::core::error::AppResult;
use crate::core::settings::Scope;
use crate::core::validation::{parse_body, validate_value};
use crate::server::state::AppState;
use crate::upgrades::UpdateFinished;

const NOT_ALLOWED: &str = "You are not allowed to update this app.";

/// 401 unless the caller is an owner
fn owner_only(current: &CurrentUser) -> Result<(), Response> {
    match current.user() {
        Some(user) if user.is_owner() => Ok(()),
        other => {
            tracing::warn!(user_id = other.map(|u| u.id), "update refused");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": NOT_ALLOWED })),
            )
                .into_response())
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VersionBody {
    #[validate(length(min = 1, message = "The version field is required."))]
    pub version: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PathBody {
    #[validate(length(min = 1, message = "The path field is required."))]
    pub path: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DeleteFilesBody {
    pub deleted_files: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct FinishBody {
    #[validate(length(min = 1, message = "The installed field is required."))]
    pub installed: String,

    #[validate(length(min = 1, message = "The version field is required."))]
    pub version: String,
}

pub async fn check_update(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }

    let installed = state
        .settings
        .get_setting("version", Scope::Global)
        .await?
        .unwrap_or_default();

    let result = state.updater.check_for_update(&installed).await?;
    Ok(Json(result).into_response())
}

pub async fn download_update(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }
    let body: VersionBody = validate_value(parse_body(&body)?)?;

    let result = state.updater.download(&body.version).await?;
    Ok(Json(result).into_response())
}

/// Extraction failures answer 500 with `{success: false, error}`
pub async fn unzip_update(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }
    let body: PathBody = validate_value(parse_body(&body)?)?;

    let response = match state.updater.unzip(&body.path).await {
        Ok(path) => Json(json!({ "success": true, "path": path })).into_response(),
        Err(e) => {
            tracing::error!(path = %body.path, error = %e, "update unzip failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    };
    Ok(response)
}

pub async fn copy_update(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }
    let body: PathBody = validate_value(parse_body(&body)?)?;

    let copied = state.updater.copy_files(&body.path).await?;
    Ok(Json(json!({ "success": copied })).into_response())
}

/// Nothing to delete is still a success
pub async fn delete_files(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }
    let body: DeleteFilesBody = validate_value(parse_body(&body)?)?;

    if let Some(files) = body.deleted_files.filter(|files| !files.is_empty()) {
        state.updater.delete_files(&files).await?;
    }
    Ok(Json(json!({ "success": true })).into_response())
}

pub async fn migrate_update(State(state): State<AppState>, current: CurrentUser) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }

    state.updater.migrate().await?;
    Ok(Json(json!({ "success": true })).into_response())
}

/// Run the upgrade steps newer than `installed`
pub async fn finish_update(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Response> {
    if let Err(denied) = owner_only(&current) {
        return Ok(denied);
    }
    let body: FinishBody = validate_value(parse_body(&body)?)?;

    let event = UpdateFinished::new(body.installed, body.version);
    let applied = state
        .upgrades
        .run(&state.upgrade_context(), &event)
        .await?;
    tracing::info!(old = %event.old, new = %event.new, applied = ?applied, "update finished");

    Ok(Json(json!({ "success": true, "error": false, "data": Value::Array(vec![]) })).into_response())
}

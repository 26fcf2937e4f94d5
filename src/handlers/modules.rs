//! Marketplace module installation, gated by `manage modules`
//!
//! The ability is checked before the body is parsed, so callers without it
//! get a 403 whatever they send.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::core::auth::CurrentUser;
use crate::core::error::AppResult;
use crate::core::validation::{parse_body, validate_value};
use crate::installer::{InstallerError, require_token};
use crate::server::state::AppState;

const ABILITY: &str = "manage modules";

fn authorize(state: &AppState, current: &CurrentUser) -> AppResult<()> {
    let user = current.require()?;
    state.gate.authorize(user, ABILITY)?;
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TokenBody {
    pub api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ModuleVersionBody {
    #[validate(length(min = 1, message = "The module field is required."))]
    pub module: String,

    pub version: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ModulePathBody {
    #[validate(length(min = 1, message = "The module field is required."))]
    pub module: String,

    #[validate(length(min = 1, message = "The path field is required."))]
    pub path: String,
}

/// Verify a marketplace token; 400 when absent or blank, 401 when rejected
pub async fn check_token(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    let body: TokenBody = validate_value(parse_body(&body)?)?;

    let token = require_token(body.api_token.as_deref())?;
    Ok(Json(state.modules.check_token(token).await?))
}

/// A failed download is reported in the body, not as an error status
pub async fn download_module(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    let body: ModuleVersionBody = validate_value(parse_body(&body)?)?;

    match state.modules.download(&body.module, &body.version).await {
        Ok(result) => Ok(Json(result)),
        Err(InstallerError::Failed(message)) => {
            tracing::warn!(module = %body.module, %message, "module download failed");
            Ok(Json(json!({ "success": false, "error": message })))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn unzip_module(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    let body: ModulePathBody = validate_value(parse_body(&body)?)?;

    let path = state.modules.unzip(&body.module, &body.path).await?;
    Ok(Json(json!({ "success": true, "path": path })))
}

pub async fn copy_module(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    let body: ModulePathBody = validate_value(parse_body(&body)?)?;

    let copied = state.modules.copy_files(&body.module, &body.path).await?;
    Ok(Json(json!({ "success": copied })))
}

pub async fn complete_module(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Bytes,
) -> AppResult<Json<Value>> {
    authorize(&state, &current)?;
    let body: ModuleVersionBody = validate_value(parse_body(&body)?)?;

    let completed = state.modules.complete(&body.module, &body.version).await?;
    Ok(Json(json!({ "success": completed })))
}

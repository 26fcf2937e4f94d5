//! HTTP handlers
//!
//! One function per endpoint. Each handler authorizes, calls its
//! collaborators through [`AppState`](crate::server::AppState) and shapes
//! the JSON the client expects. Failures travel as
//! [`AppError`](crate::core::AppError) unless the endpoint has its own
//! error body.

pub mod cron;
pub mod disks;
pub mod health;
pub mod installation;
pub mod mail;
pub mod modules;
pub mod settings;
pub mod update;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// `{code, message}` body for expected refusals
pub fn respond_json(code: &str, message: &str) -> Response {
    respond_json_with(code, message, StatusCode::BAD_REQUEST)
}

pub fn respond_json_with(code: &str, message: &str, status: StatusCode) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

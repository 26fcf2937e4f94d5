//! Module installer and application updater
//!
//! Downloading archives, extracting them and copying files is delegated to
//! implementations of [`ModuleInstaller`] and [`Updater`]. The handlers only
//! orchestrate the steps and shape the JSON responses.
//!
//! The local implementations shipped here never touch the network or the
//! filesystem; they compute the paths a real installer would use.

pub mod local;

use async_trait::async_trait;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

pub use local::{LocalModuleInstaller, LocalUpdater};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InstallerError {
    #[error("API token is required")]
    MissingToken,

    #[error("API token cannot be empty")]
    EmptyToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Failed(String),
}

impl InstallerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InstallerError::MissingToken | InstallerError::EmptyToken => StatusCode::BAD_REQUEST,
            InstallerError::InvalidToken => StatusCode::UNAUTHORIZED,
            InstallerError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InstallerError::MissingToken => "MISSING_TOKEN",
            InstallerError::EmptyToken => "EMPTY_TOKEN",
            InstallerError::InvalidToken => "INVALID_TOKEN",
            InstallerError::Failed(_) => "INSTALLER_FAILED",
        }
    }
}

/// Installer failures keep the `{success: false, message}` shape clients expect
impl IntoResponse for InstallerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        (
            status,
            Json(json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}

/// Reject absent or empty marketplace tokens before calling the installer
pub fn require_token(token: Option<&str>) -> Result<&str, InstallerError> {
    match token {
        None => Err(InstallerError::MissingToken),
        Some(token) if token.trim().is_empty() => Err(InstallerError::EmptyToken),
        Some(token) => Ok(token),
    }
}

/// Marketplace module installation
#[async_trait]
pub trait ModuleInstaller: Send + Sync {
    /// Verify a marketplace API token; the payload is passed through
    async fn check_token(&self, token: &str) -> Result<Value, InstallerError>;

    /// Fetch a module archive; returns `{success, path}`
    async fn download(&self, module: &str, version: &str) -> Result<Value, InstallerError>;

    /// Extract a downloaded archive, returning the extracted directory
    async fn unzip(&self, module: &str, zip_path: &str) -> Result<String, InstallerError>;

    async fn copy_files(&self, module: &str, path: &str) -> Result<bool, InstallerError>;

    /// Register, migrate and enable the module
    async fn complete(&self, module: &str, version: &str) -> Result<bool, InstallerError>;
}

/// Application self-update
#[async_trait]
pub trait Updater: Send + Sync {
    /// Ask for a release newer than `installed`; the payload is passed through
    async fn check_for_update(&self, installed: &str) -> Result<Value, InstallerError>;

    /// Fetch a release archive; returns `{success, path}`
    async fn download(&self, version: &str) -> Result<Value, InstallerError>;

    async fn unzip(&self, zip_path: &str) -> Result<String, InstallerError>;

    async fn copy_files(&self, path: &str) -> Result<bool, InstallerError>;

    async fn delete_files(&self, files: &[String]) -> Result<(), InstallerError>;

    async fn migrate(&self) -> Result<(), InstallerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_token() {
        assert_eq!(require_token(None), Err(InstallerError::MissingToken));
        assert_eq!(require_token(Some("")), Err(InstallerError::EmptyToken));
        assert_eq!(require_token(Some("  ")), Err(InstallerError::EmptyToken));
        assert_eq!(require_token(Some("abc")), Ok("abc"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(InstallerError::MissingToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(InstallerError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            InstallerError::Failed("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(InstallerError::MissingToken.to_string(), "API token is required");
        assert_eq!(InstallerError::EmptyToken.to_string(), "API token cannot be empty");
        assert_eq!(InstallerError::Failed("Zip not found".into()).to_string(), "Zip not found");
    }
}

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::{InstallerError, ModuleInstaller, Updater};
use crate::core::version;

/// `<root>/temp-<32 hex>/upload.zip`
fn temp_archive(root: &str) -> String {
    format!(
        "{}/temp-{}/upload.zip",
        root.trim_end_matches('/'),
        Uuid::new_v4().simple()
    )
}

/// Directory an archive is extracted to, next to the archive itself
fn extract_dir(zip_path: &str, name: &str) -> Result<String, InstallerError> {
    let Some(parent) = zip_path.strip_suffix(".zip").and_then(|p| p.rsplit_once('/')) else {
        return Err(InstallerError::Failed("Zip file not found".to_string()));
    };
    Ok(format!("{}/{}", parent.0, name))
}

/// Module installer that accepts a fixed set of marketplace tokens
#[derive(Clone, Default)]
pub struct LocalModuleInstaller {
    temp_root: String,
    tokens: HashSet<String>,
    completed: Arc<RwLock<Vec<(String, String)>>>,
}

impl LocalModuleInstaller {
    pub fn new(temp_root: impl Into<String>) -> Self {
        Self {
            temp_root: temp_root.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.insert(token.into());
        self
    }

    /// `(module, version)` pairs completed so far
    pub fn completed(&self) -> Vec<(String, String)> {
        self.completed
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModuleInstaller for LocalModuleInstaller {
    async fn check_token(&self, token: &str) -> Result<Value, InstallerError> {
        if self.tokens.contains(token) {
            Ok(json!({ "success": true, "message": "Token verified" }))
        } else {
            Err(InstallerError::InvalidToken)
        }
    }

    async fn download(&self, module: &str, version: &str) -> Result<Value, InstallerError> {
        if module.is_empty() || version.is_empty() {
            return Err(InstallerError::Failed("Module not found".to_string()));
        }
        Ok(json!({ "success": true, "path": temp_archive(&self.temp_root) }))
    }

    async fn unzip(&self, module: &str, zip_path: &str) -> Result<String, InstallerError> {
        extract_dir(zip_path, module)
    }

    async fn copy_files(&self, module: &str, path: &str) -> Result<bool, InstallerError> {
        Ok(!module.is_empty() && !path.is_empty())
    }

    async fn complete(&self, module: &str, version: &str) -> Result<bool, InstallerError> {
        if module.is_empty() {
            return Ok(false);
        }

        let mut completed = self
            .completed
            .write()
            .map_err(|e| InstallerError::Failed(format!("Failed to acquire write lock: {}", e)))?;
        completed.push((module.to_string(), version.to_string()));
        tracing::info!(module, version, "module installation completed");
        Ok(true)
    }
}

/// Updater that knows the latest release but fetches nothing
#[derive(Clone, Default)]
pub struct LocalUpdater {
    temp_root: String,
    latest: Option<String>,
    deleted: Arc<RwLock<Vec<String>>>,
}

impl LocalUpdater {
    pub fn new(temp_root: impl Into<String>) -> Self {
        Self {
            temp_root: temp_root.into(),
            ..Self::default()
        }
    }

    /// Advertise `version` as the latest release
    pub fn with_latest(mut self, version: impl Into<String>) -> Self {
        self.latest = Some(version.into());
        self
    }

    /// Files removed by `delete_files`
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.read().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Updater for LocalUpdater {
    async fn check_for_update(&self, installed: &str) -> Result<Value, InstallerError> {
        let newer = self
            .latest
            .as_deref()
            .filter(|latest| !version::is_listener_fired(latest, installed));

        Ok(match newer {
            Some(latest) => json!({ "success": true, "version": { "version": latest } }),
            None => json!({ "success": false, "version": null }),
        })
    }

    async fn download(&self, version: &str) -> Result<Value, InstallerError> {
        if version.is_empty() {
            return Err(InstallerError::Failed("Download Exception".to_string()));
        }
        Ok(json!({ "success": true, "path": temp_archive(&self.temp_root) }))
    }

    async fn unzip(&self, zip_path: &str) -> Result<String, InstallerError> {
        extract_dir(zip_path, "update")
    }

    async fn copy_files(&self, path: &str) -> Result<bool, InstallerError> {
        Ok(!path.is_empty())
    }

    async fn delete_files(&self, files: &[String]) -> Result<(), InstallerError> {
        let mut deleted = self
            .deleted
            .write()
            .map_err(|e| InstallerError::Failed(format!("Failed to acquire write lock: {}", e)))?;
        deleted.extend(files.iter().cloned());
        Ok(())
    }

    async fn migrate(&self) -> Result<(), InstallerError> {
        tracing::info!("running pending migrations");
        Ok(())
    }
}

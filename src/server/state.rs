//! Application state shared across handlers and middleware

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{
    Authenticator, CatalogStore, CompanyDirectory, CurrencyStore, DiskStore, Gate,
    SettingsStore, UserDirectory,
};
use crate::installer::{ModuleInstaller, Updater};
use crate::jobs::JobQueue;
use crate::upgrades::{UpgradeContext, UpgradeRunner};

/// Every collaborator a handler may need, behind its trait
///
/// Cheap to clone; all fields are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<dyn Gate>,
    pub authenticator: Arc<dyn Authenticator>,
    pub settings: Arc<dyn SettingsStore>,
    pub currencies: Arc<dyn CurrencyStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserDirectory>,
    pub companies: Arc<dyn CompanyDirectory>,
    pub disks: Arc<dyn DiskStore>,
    pub modules: Arc<dyn ModuleInstaller>,
    pub updater: Arc<dyn Updater>,
    pub jobs: JobQueue,
    pub upgrades: Arc<UpgradeRunner>,
}

impl AppState {
    /// Collaborators handed to upgrade steps
    pub fn upgrade_context(&self) -> UpgradeContext {
        UpgradeContext {
            settings: self.settings.clone(),
            currencies: self.currencies.clone(),
            catalog: self.catalog.clone(),
            users: self.users.clone(),
        }
    }
}

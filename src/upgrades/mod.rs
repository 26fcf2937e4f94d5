//! Version-gated data upgrades
//!
//! When an update finishes, every [`UpgradeStep`] newer than the version
//! that was installed before runs once, in ascending version order, and then
//! stamps the global `version` setting with its own version. Steps that are
//! not newer are skipped, so re-running the same event is harmless.
//!
//! ```text
//! UpdateFinished { old: "2.0.0", new: "3.0.0" }
//!     1.1.0  skipped (already fired)
//!     2.0.0  skipped
//!     2.0.1  apply, version = 2.0.1
//!     2.1.0  apply, version = 2.1.0
//!     3.0.0  apply, version = 3.0.0
//! ```

pub mod runner;
pub mod stamp;
pub mod v110;
pub mod v210;
pub mod v300;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::version;
use crate::core::{CatalogStore, CurrencyStore, Scope, SettingsStore, UserDirectory};
use crate::entities::CompanyId;

pub use runner::UpgradeRunner;
pub use stamp::StampVersion;
pub use v110::Version110;
pub use v210::Version210;
pub use v300::Version300;

/// Raised once an update has been copied and migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFinished {
    /// Version installed before the update
    pub old: String,
    /// Version installed by the update
    pub new: String,
}

impl UpdateFinished {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    #[error("Upgrade {version} requires an administrator but none exists")]
    MissingAdmin { version: String },

    #[error("Upgrade {version}: administrator {user_id} belongs to no company")]
    AdminWithoutCompany { version: String, user_id: u64 },

    #[error("Upgrade {version} failed: {message}")]
    Store { version: String, message: String },
}

/// Collaborators available to upgrade steps
#[derive(Clone)]
pub struct UpgradeContext {
    pub settings: Arc<dyn SettingsStore>,
    pub currencies: Arc<dyn CurrencyStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserDirectory>,
}

impl UpgradeContext {
    /// Company of the first administrator; data seeded by upgrades lands there
    pub async fn admin_company(&self, version: &str) -> Result<CompanyId, UpgradeError> {
        let admin = self
            .users
            .first_admin()
            .await
            .map_err(|e| store_error(version, e))?
            .ok_or_else(|| UpgradeError::MissingAdmin {
                version: version.to_string(),
            })?;

        admin
            .first_company()
            .ok_or_else(|| UpgradeError::AdminWithoutCompany {
                version: version.to_string(),
                user_id: admin.id,
            })
    }
}

/// Wrap a store failure with the version of the step that hit it
pub(crate) fn store_error(version: &str, err: anyhow::Error) -> UpgradeError {
    UpgradeError::Store {
        version: version.to_string(),
        message: err.to_string(),
    }
}

/// One idempotent data upgrade pinned to a release
#[async_trait]
pub trait UpgradeStep: Send + Sync {
    /// Release this step belongs to
    fn version(&self) -> &'static str;

    /// Perform the data changes; must be safe to repeat
    async fn apply(&self, ctx: &UpgradeContext) -> Result<(), UpgradeError>;

    fn is_listener_fired(&self, event: &UpdateFinished) -> bool {
        version::is_listener_fired(self.version(), &event.old)
    }

    /// Run the step for `event`; `Ok(false)` when it had already fired
    async fn handle(&self, ctx: &UpgradeContext, event: &UpdateFinished) -> Result<bool, UpgradeError> {
        if self.is_listener_fired(event) {
            tracing::debug!(version = self.version(), old = %event.old, "upgrade already fired");
            return Ok(false);
        }

        self.apply(ctx).await?;
        ctx.settings
            .set_setting("version", self.version(), Scope::Global)
            .await
            .map_err(|e| store_error(self.version(), e))?;

        tracing::info!(version = self.version(), "upgrade applied");
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::entities::{Role, User};
    use crate::storage::{
        InMemoryCatalogStore, InMemoryCurrencyStore, InMemoryDirectory, InMemorySettingsStore,
    };

    pub struct Fixture {
        pub ctx: UpgradeContext,
        pub settings: InMemorySettingsStore,
        pub currencies: InMemoryCurrencyStore,
        pub catalog: InMemoryCatalogStore,
        pub directory: InMemoryDirectory,
    }

    /// Stores with one admin attached to company 1
    pub fn fixture() -> Fixture {
        let directory = InMemoryDirectory::new();
        directory
            .insert_user(
                User::new(1, "Ada", "ada@example.com", Role::Owner).with_company(1),
                None,
            )
            .unwrap();
        fixture_with(directory)
    }

    pub fn fixture_with(directory: InMemoryDirectory) -> Fixture {
        let settings = InMemorySettingsStore::new();
        let currencies = InMemoryCurrencyStore::new();
        let catalog = InMemoryCatalogStore::new();

        let ctx = UpgradeContext {
            settings: Arc::new(settings.clone()),
            currencies: Arc::new(currencies.clone()),
            catalog: Arc::new(catalog.clone()),
            users: Arc::new(directory.clone()),
        };

        Fixture {
            ctx,
            settings,
            currencies,
            catalog,
            directory,
        }
    }
}

//! Key/value settings, global or per company

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::fmt;

use crate::entities::CompanyId;

/// Where a setting lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Company(CompanyId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Company(id) => write!(f, "company:{}", id),
        }
    }
}

/// Settings persistence
///
/// Values are strings; callers convert as needed. Bulk reads return only
/// the keys that exist, in the order they were asked for.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str, scope: Scope) -> Result<Option<String>>;

    async fn set_setting(&self, key: &str, value: &str, scope: Scope) -> Result<()>;

    /// Upsert every pair; an empty map writes nothing
    async fn set_settings(&self, settings: &IndexMap<String, String>, scope: Scope) -> Result<()> {
        for (key, value) in settings {
            self.set_setting(key, value, scope).await?;
        }
        Ok(())
    }

    async fn get_settings(&self, keys: &[&str], scope: Scope) -> Result<IndexMap<String, String>> {
        let mut found = IndexMap::new();
        for key in keys {
            if let Some(value) = self.get_setting(key, scope).await? {
                found.insert(key.to_string(), value);
            }
        }
        Ok(found)
    }

    async fn get_all_settings(&self, scope: Scope) -> Result<IndexMap<String, String>>;
}

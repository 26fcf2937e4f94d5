//! In-memory stores for testing and development
//!
//! Every store guards its data with an `RwLock` behind an `Arc`, so clones
//! share state.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::core::{
    Authenticator, CatalogStore, CompanyDirectory, CurrencyStore, DiskStore, Scope,
    SettingsStore, UserDirectory,
};
use crate::entities::file_disk::{DISK_DRIVERS, credential_fields};
use crate::entities::{
    Company, CompanyId, Currency, CurrencyPatch, FileDisk, NewCurrency, NewFileDisk,
    PaymentMethod, Unit, User, UserId,
};

// =============================================================================
// Settings
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<HashMap<Scope, IndexMap<String, String>>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_setting(&self, key: &str, scope: Scope) -> Result<Option<String>> {
        let settings = self
            .settings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(settings.get(&scope).and_then(|s| s.get(key)).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str, scope: Scope) -> Result<()> {
        let mut settings = self
            .settings
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        settings
            .entry(scope)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_settings(&self, values: &IndexMap<String, String>, scope: Scope) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let mut settings = self
            .settings
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let entries = settings.entry(scope).or_default();
        for (key, value) in values {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn get_all_settings(&self, scope: Scope) -> Result<IndexMap<String, String>> {
        let settings = self
            .settings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(settings.get(&scope).cloned().unwrap_or_default())
    }
}

// =============================================================================
// Currencies
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryCurrencyStore {
    currencies: Arc<RwLock<BTreeMap<u64, Currency>>>,
}

impl InMemoryCurrencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given records already present
    pub fn with_currencies(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let map = currencies.into_iter().map(|c| (c.id, c)).collect();
        Self {
            currencies: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl CurrencyStore for InMemoryCurrencyStore {
    async fn update_or_create(&self, id: u64, patch: CurrencyPatch) -> Result<Currency> {
        let mut currencies = self
            .currencies
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let currency = match currencies.get_mut(&id) {
            Some(existing) => {
                patch.apply(existing);
                existing.clone()
            }
            None => {
                let created = patch.into_currency(id);
                currencies.insert(id, created.clone());
                created
            }
        };
        Ok(currency)
    }

    async fn create(&self, currency: NewCurrency) -> Result<Currency> {
        let mut currencies = self
            .currencies
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = currencies.keys().next_back().map_or(1, |last| last + 1);
        let created = currency.into_currency(id);
        currencies.insert(id, created.clone());
        Ok(created)
    }

    async fn find(&self, id: u64) -> Result<Option<Currency>> {
        let currencies = self
            .currencies
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(currencies.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Currency>> {
        let currencies = self
            .currencies
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(currencies.values().find(|c| c.code == code).cloned())
    }

    async fn list(&self) -> Result<Vec<Currency>> {
        let currencies = self
            .currencies
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(currencies.values().cloned().collect())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Default)]
struct Catalog {
    units: Vec<Unit>,
    payment_methods: Vec<PaymentMethod>,
}

#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn first_or_create_unit(&self, company_id: CompanyId, name: &str) -> Result<Unit> {
        let mut catalog = self
            .catalog
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(unit) = catalog
            .units
            .iter()
            .find(|u| u.company_id == company_id && u.name == name)
        {
            return Ok(unit.clone());
        }

        let unit = Unit::new(catalog.units.len() as u64 + 1, company_id, name.to_string());
        catalog.units.push(unit.clone());
        Ok(unit)
    }

    async fn units(&self, company_id: CompanyId) -> Result<Vec<Unit>> {
        let catalog = self
            .catalog
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(catalog
            .units
            .iter()
            .filter(|u| u.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn first_or_create_payment_method(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<PaymentMethod> {
        let mut catalog = self
            .catalog
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(method) = catalog
            .payment_methods
            .iter()
            .find(|m| m.company_id == company_id && m.name == name)
        {
            return Ok(method.clone());
        }

        let method = PaymentMethod::new(
            catalog.payment_methods.len() as u64 + 1,
            company_id,
            name.to_string(),
        );
        catalog.payment_methods.push(method.clone());
        Ok(method)
    }

    async fn payment_methods(&self, company_id: CompanyId) -> Result<Vec<PaymentMethod>> {
        let catalog = self
            .catalog
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(catalog
            .payment_methods
            .iter()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Users and companies
// =============================================================================

#[derive(Default)]
struct Directory {
    users: BTreeMap<UserId, User>,
    companies: BTreeMap<CompanyId, Company>,
    tokens: HashMap<String, UserId>,
    with_transactions: HashSet<CompanyId>,
}

/// Users, their API tokens and companies
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    directory: Arc<RwLock<Directory>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user reachable through `token`
    pub fn insert_user(&self, user: User, token: Option<&str>) -> Result<()> {
        let mut directory = self
            .directory
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(token) = token {
            directory.tokens.insert(token.to_string(), user.id);
        }
        directory.users.insert(user.id, user);
        Ok(())
    }

    pub fn insert_company(&self, company: Company) -> Result<()> {
        let mut directory = self
            .directory
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        directory.companies.insert(company.id, company);
        Ok(())
    }

    /// Record that the company has billed something
    pub fn mark_transactions(&self, company_id: CompanyId) -> Result<()> {
        let mut directory = self
            .directory
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        directory.with_transactions.insert(company_id);
        Ok(())
    }
}

#[async_trait]
impl Authenticator for InMemoryDirectory {
    async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let directory = self
            .directory
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(directory
            .tokens
            .get(token)
            .and_then(|id| directory.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let directory = self
            .directory
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(directory.users.get(&id).cloned())
    }

    async fn first_admin(&self) -> Result<Option<User>> {
        let directory = self
            .directory
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(directory.users.values().find(|u| u.is_admin()).cloned())
    }
}

#[async_trait]
impl CompanyDirectory for InMemoryDirectory {
    async fn find_company(&self, id: CompanyId) -> Result<Option<Company>> {
        let directory = self
            .directory
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(directory.companies.get(&id).cloned())
    }

    async fn has_transactions(&self, id: CompanyId) -> Result<bool> {
        let directory = self
            .directory
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(directory.with_transactions.contains(&id))
    }
}

// =============================================================================
// File disks
// =============================================================================

#[derive(Clone, Default)]
pub struct InMemoryDiskStore {
    disks: Arc<RwLock<BTreeMap<u64, FileDisk>>>,
}

impl InMemoryDiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the given disks
    pub fn with_disks(disks: impl IntoIterator<Item = FileDisk>) -> Self {
        let map = disks.into_iter().map(|d| (d.id, d)).collect();
        Self {
            disks: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl DiskStore for InMemoryDiskStore {
    async fn list(&self) -> Result<Vec<FileDisk>> {
        let disks = self
            .disks
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        // Latest first
        Ok(disks.values().rev().cloned().collect())
    }

    async fn find(&self, id: u64) -> Result<Option<FileDisk>> {
        let disks = self
            .disks
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(disks.get(&id).cloned())
    }

    async fn create(&self, disk: NewFileDisk, company_id: Option<CompanyId>) -> Result<FileDisk> {
        let mut disks = self
            .disks
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = disks.keys().next_back().map_or(1, |last| last + 1);
        let created = disk.into_disk(id, company_id);
        if created.set_as_default {
            for other in disks.values_mut() {
                other.set_as_default = false;
            }
        }
        disks.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, disk: FileDisk) -> Result<FileDisk> {
        let mut disks = self
            .disks
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        disks
            .get_mut(&disk.id)
            .ok_or_else(|| anyhow!("File disk not found"))?;
        disks.insert(disk.id, disk.clone());
        Ok(disk)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let mut disks = self
            .disks
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        disks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("File disk not found"))
    }

    async fn set_default(&self, id: u64) -> Result<()> {
        let mut disks = self
            .disks
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !disks.contains_key(&id) {
            return Err(anyhow!("File disk not found"));
        }
        for disk in disks.values_mut() {
            disk.set_as_default = disk.id == id;
        }
        Ok(())
    }

    /// Accepts a known driver whose credentials fill every field it expects
    async fn validate_credentials(
        &self,
        credentials: &Map<String, Value>,
        driver: &str,
    ) -> Result<bool> {
        if !DISK_DRIVERS.iter().any(|(_, value)| *value == driver) {
            return Ok(false);
        }

        Ok(credential_fields(driver).iter().all(|field| {
            credentials
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|value| !value.trim().is_empty())
        }))
    }
}

//! Store traits for the records the application layer touches
//!
//! Handlers and upgrade steps only see these traits. Implementations are
//! free to use any persistence; the crate ships in-memory ones.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::entities::{
    Company, CompanyId, Currency, CurrencyPatch, FileDisk, NewCurrency, NewFileDisk,
    PaymentMethod, Unit, User, UserId,
};

/// Currencies are global
#[async_trait]
pub trait CurrencyStore: Send + Sync {
    /// Patch the currency with `id`, creating it when missing
    async fn update_or_create(&self, id: u64, patch: CurrencyPatch) -> Result<Currency>;

    async fn create(&self, currency: NewCurrency) -> Result<Currency>;

    async fn find(&self, id: u64) -> Result<Option<Currency>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Currency>>;

    async fn list(&self) -> Result<Vec<Currency>>;
}

/// Per-company units and payment methods
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Return the unit named `name`, inserting it first if needed
    async fn first_or_create_unit(&self, company_id: CompanyId, name: &str) -> Result<Unit>;

    async fn units(&self, company_id: CompanyId) -> Result<Vec<Unit>>;

    async fn first_or_create_payment_method(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<PaymentMethod>;

    async fn payment_methods(&self, company_id: CompanyId) -> Result<Vec<PaymentMethod>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    /// First administrator by id; upgrades seed data for their company
    async fn first_admin(&self) -> Result<Option<User>>;
}

#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn find_company(&self, id: CompanyId) -> Result<Option<Company>>;

    /// Whether invoices, estimates or payments exist for the company
    async fn has_transactions(&self, id: CompanyId) -> Result<bool>;
}

#[async_trait]
pub trait DiskStore: Send + Sync {
    async fn list(&self) -> Result<Vec<FileDisk>>;

    async fn find(&self, id: u64) -> Result<Option<FileDisk>>;

    async fn create(&self, disk: NewFileDisk, company_id: Option<CompanyId>) -> Result<FileDisk>;

    async fn update(&self, disk: FileDisk) -> Result<FileDisk>;

    async fn delete(&self, id: u64) -> Result<()>;

    /// Make `id` the only default disk
    async fn set_default(&self, id: u64) -> Result<()>;

    /// Probe the remote with the given credentials
    async fn validate_credentials(&self, credentials: &Map<String, Value>, driver: &str)
    -> Result<bool>;
}

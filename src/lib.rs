//! # Invoicer
//!
//! Application layer of an invoicing back office, served over HTTP with axum.
//!
//! ## Features
//!
//! - **Authorization**: ability gate plus per-resource policies scoped to companies
//! - **Self-update**: owner-only download / unzip / copy / migrate / finish workflow
//! - **Versioned upgrades**: data upgrades that run once per release, in version order
//! - **Module marketplace**: token check and module installation steps
//! - **Settings**: global and per-company settings, mail and database configuration
//! - **File disks**: storage disk management with credential checks
//! - **Declarative validation**: rule tables per request
//! - **Background jobs**: queued PDF regeneration drained by a cron endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoicer::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let directory = InMemoryDirectory::new();
//!     directory.insert_user(
//!         User::new(1, "Ada", "ada@example.com", Role::Owner).with_company(1),
//!         Some("owner-token"),
//!     )?;
//!     directory.insert_company(Company::new(1, "Acme").owned_by(1))?;
//!
//!     ServerBuilder::new()
//!         .with_config(AppConfig::default().with_env_overrides())
//!         .with_directory(directory)
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod handlers;
pub mod installer;
pub mod jobs;
pub mod policies;
pub mod server;
pub mod storage;
pub mod upgrades;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        AbilityGate, AppError, AppResult, Authenticator, CatalogStore, CompanyDirectory,
        CompanyScope, CurrencyStore, CurrentUser, DiskStore, Gate, NoAuthenticator,
        RequestError, Scope, SettingsStore, UserDirectory,
    };

    // === Validation ===
    pub use crate::core::validation::{FormRequest, RuleSet, Validated};

    // === Entities ===
    pub use crate::entities::{
        Company, CompanyId, CompanyResource, Currency, FileDisk, Invoice, Role, User, UserId,
    };

    // === Macros ===
    pub use crate::impl_company_resource;

    // === Policies ===
    pub use crate::policies::{Action, OwnerPolicy, ResourcePolicy};

    // === Installer / Jobs / Upgrades ===
    pub use crate::installer::{InstallerError, ModuleInstaller, Updater};
    pub use crate::jobs::{GeneratePdfJob, GeneratesPdf, JobQueue};
    pub use crate::upgrades::{UpdateFinished, UpgradeRunner, UpgradeStep};

    // === Storage ===
    pub use crate::storage::{
        InMemoryCatalogStore, InMemoryCurrencyStore, InMemoryDirectory, InMemoryDiskStore,
        InMemorySettingsStore,
    };

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{get, post},
    };
}

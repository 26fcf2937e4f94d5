//! Shared fixture for the HTTP integration tests
//!
//! Builds the full router over in-memory stores and keeps handles on every
//! store so tests can seed data and inspect side effects.
//!
//! ```text
//! owner-token    Owner  (id 1)  company 1
//! admin-token    Admin  (id 2)  company 1, no abilities
//! manager-token  Member (id 3)  company 1, settings / company / mail / disk abilities
//! ```
//!
//! Company 2 exists but has no members.

#![allow(dead_code)]

use axum_test::TestServer;
use invoicer::installer::{LocalModuleInstaller, LocalUpdater};
use invoicer::prelude::*;
use serde_json::Value;

pub const OWNER: &str = "Bearer owner-token";
pub const ADMIN: &str = "Bearer admin-token";
pub const MANAGER: &str = "Bearer manager-token";
pub const CRON_SECRET: &str = "cron-secret";
pub const MARKET_TOKEN: &str = "market-123";

pub struct Harness {
    pub server: TestServer,
    pub directory: InMemoryDirectory,
    pub settings: InMemorySettingsStore,
    pub currencies: InMemoryCurrencyStore,
    pub catalog: InMemoryCatalogStore,
    pub disks: InMemoryDiskStore,
    pub updater: LocalUpdater,
    pub modules: LocalModuleInstaller,
    pub jobs: JobQueue,
}

fn seed_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();

    directory
        .insert_company(Company::new(1, "Acme Corp").owned_by(1))
        .unwrap();
    directory.insert_company(Company::new(2, "Globex")).unwrap();

    directory
        .insert_user(
            User::new(1, "Olivia Owner", "owner@acme.test", Role::Owner).with_company(1),
            Some("owner-token"),
        )
        .unwrap();
    directory
        .insert_user(
            User::new(2, "Adam Admin", "admin@acme.test", Role::Admin).with_company(1),
            Some("admin-token"),
        )
        .unwrap();
    directory
        .insert_user(
            User::new(3, "Mia Manager", "manager@acme.test", Role::Member)
                .with_company(1)
                .with_ability("manage settings")
                .with_ability("manage company")
                .with_ability("manage email config")
                .with_ability("manage file disk"),
            Some("manager-token"),
        )
        .unwrap();

    directory
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.set(
        "services.cron_job.auth_token",
        Value::String(CRON_SECRET.to_string()),
    );
    config.set(
        "filesystems.disks.local.root",
        Value::String("/srv/invoicer/storage/app".to_string()),
    );
    config
}

pub fn harness() -> Harness {
    harness_with(InMemoryDiskStore::new())
}

pub fn harness_with(disks: InMemoryDiskStore) -> Harness {
    let directory = seed_directory();
    let settings = InMemorySettingsStore::new();
    let currencies = InMemoryCurrencyStore::new();
    let catalog = InMemoryCatalogStore::new();
    let updater = LocalUpdater::new("/srv/invoicer/storage/app").with_latest("3.0.0");
    let modules = LocalModuleInstaller::new("/srv/invoicer/storage/app").with_token(MARKET_TOKEN);
    let jobs = JobQueue::new();

    let app = ServerBuilder::new()
        .with_config(test_config())
        .with_directory(directory.clone())
        .with_settings_store(settings.clone())
        .with_currency_store(currencies.clone())
        .with_catalog_store(catalog.clone())
        .with_disk_store(disks.clone())
        .with_updater(updater.clone())
        .with_module_installer(modules.clone())
        .with_job_queue(jobs.clone())
        .build()
        .unwrap();

    Harness {
        server: TestServer::new(app),
        directory,
        settings,
        currencies,
        catalog,
        disks,
        updater,
        modules,
        jobs,
    }
}

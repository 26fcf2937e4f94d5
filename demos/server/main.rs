//! Invoicer demo server
//!
//! Starts the full API on top of in-memory stores with:
//! - one owner (`owner-token`) and one member (`member-token`) in company 1
//! - a local updater advertising release 3.0.0
//! - a marketplace token `market-token`
//! - two queued PDF jobs, drained by `POST /api/cron`
//!
//! ```text
//! curl -H 'Authorization: Bearer owner-token' localhost:3000/api/v1/check/update
//! curl -X POST -H 'x-authorization-token: cron-secret' localhost:3000/api/cron
//! ```

use anyhow::Result;
use async_trait::async_trait;
use invoicer::installer::{LocalModuleInstaller, LocalUpdater};
use invoicer::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ADDR: &str = "127.0.0.1:3000";

/// Stand-in for a rendered invoice; logs instead of writing a file
struct DemoInvoice {
    number: String,
}

#[async_trait]
impl GeneratesPdf for DemoInvoice {
    fn pdf_name(&self) -> String {
        self.number.clone()
    }

    async fn generate_pdf(&self, delete_existing_file: bool) -> Result<()> {
        tracing::info!(invoice = %self.number, delete_existing_file, "pdf generated");
        Ok(())
    }
}

fn seed_directory() -> Result<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();

    directory.insert_company(Company::new(1, "Acme Corp").owned_by(1))?;
    directory.insert_user(
        User::new(1, "Owner", "owner@acme.test", Role::Owner).with_company(1),
        Some("owner-token"),
    )?;
    directory.insert_user(
        User::new(2, "Member", "member@acme.test", Role::Member)
            .with_company(1)
            .with_ability("manage settings")
            .with_ability("view-invoice"),
        Some("member-token"),
    )?;

    Ok(directory)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = AppConfig::default().with_env_overrides();
    if config.cron_auth_token().is_none() {
        config.set(
            "services.cron_job.auth_token",
            serde_json::Value::String("cron-secret".to_string()),
        );
    }
    let temp_root = config.local_disk_root().to_string();

    let settings = InMemorySettingsStore::new();
    settings.set_setting("version", "2.0.0", Scope::Global).await?;

    let jobs = JobQueue::new();
    for number in ["INV-000001", "INV-000002"] {
        let invoice = Arc::new(DemoInvoice {
            number: number.to_string(),
        });
        jobs.dispatch(GeneratePdfJob::new(invoice, true)).await;
    }

    println!("🚀 Starting invoicer demo on http://{}", ADDR);
    println!("\n  🔑 Tokens:");
    println!("    owner-token      Owner of company 1");
    println!("    member-token     Member with 'manage settings'");
    println!("    cron-secret      x-authorization-token for /api/cron");
    println!("\n  📋 Routes:");
    println!("    GET    /health");
    println!("    POST   /api/cron");
    println!("    GET    /api/v1/check/update");
    println!("    POST   /api/v1/update/{{download,unzip,copy,delete,migrate,finish}}");
    println!("    POST   /api/v1/modules/{{check,download,unzip,copy,complete}}");
    println!("    GET    /api/v1/settings?key=...");
    println!("    GET    /api/v1/company/settings?settings=currency,language");
    println!("    GET    /api/v1/disks");
    println!("    GET    /api/v1/mail/config");
    println!("    GET    /api/v1/installation/database/config?connection=sqlite");

    ServerBuilder::new()
        .with_config(config)
        .with_directory(seed_directory()?)
        .with_settings_store(settings)
        .with_job_queue(jobs)
        .with_updater(LocalUpdater::new(temp_root.clone()).with_latest("3.0.0"))
        .with_module_installer(LocalModuleInstaller::new(temp_root).with_token("market-token"))
        .with_cors(tower_http::cors::CorsLayer::permissive())
        .serve(ADDR)
        .await
}

//! ServerBuilder for fluent API to build HTTP servers

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::router::build_router;
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::{
    AbilityGate, Authenticator, CatalogStore, CompanyDirectory, CurrencyStore, DiskStore, Gate,
    SettingsStore, UserDirectory,
};
use crate::installer::{LocalModuleInstaller, LocalUpdater, ModuleInstaller, Updater};
use crate::jobs::JobQueue;
use crate::storage::{
    InMemoryCatalogStore, InMemoryCurrencyStore, InMemoryDirectory, InMemoryDiskStore,
    InMemorySettingsStore,
};
use crate::upgrades::UpgradeRunner;

/// Builder for the application router
///
/// Every collaborator is optional; anything not provided falls back to the
/// in-memory store or local installer.
///
/// # Example
///
/// ```ignore
/// let directory = InMemoryDirectory::new();
/// directory.insert_user(owner, Some("secret-token"))?;
///
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::from_yaml_file("config/app.yaml")?)
///     .with_directory(directory)
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<AppConfig>,
    gate: Option<Arc<dyn Gate>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    settings: Option<Arc<dyn SettingsStore>>,
    currencies: Option<Arc<dyn CurrencyStore>>,
    catalog: Option<Arc<dyn CatalogStore>>,
    users: Option<Arc<dyn UserDirectory>>,
    companies: Option<Arc<dyn CompanyDirectory>>,
    disks: Option<Arc<dyn DiskStore>>,
    modules: Option<Arc<dyn ModuleInstaller>>,
    updater: Option<Arc<dyn Updater>>,
    jobs: Option<JobQueue>,
    upgrades: Option<UpgradeRunner>,
    cors: Option<CorsLayer>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            gate: None,
            authenticator: None,
            settings: None,
            currencies: None,
            catalog: None,
            users: None,
            companies: None,
            disks: None,
            modules: None,
            updater: None,
            jobs: None,
            upgrades: None,
            cors: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn with_settings_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings = Some(Arc::new(store));
        self
    }

    pub fn with_currency_store(mut self, store: impl CurrencyStore + 'static) -> Self {
        self.currencies = Some(Arc::new(store));
        self
    }

    pub fn with_catalog_store(mut self, store: impl CatalogStore + 'static) -> Self {
        self.catalog = Some(Arc::new(store));
        self
    }

    pub fn with_disk_store(mut self, store: impl DiskStore + 'static) -> Self {
        self.disks = Some(Arc::new(store));
        self
    }

    /// Use one in-memory directory for authentication, users and companies
    pub fn with_directory(mut self, directory: InMemoryDirectory) -> Self {
        self.authenticator = Some(Arc::new(directory.clone()));
        self.users = Some(Arc::new(directory.clone()));
        self.companies = Some(Arc::new(directory));
        self
    }

    pub fn with_module_installer(mut self, installer: impl ModuleInstaller + 'static) -> Self {
        self.modules = Some(Arc::new(installer));
        self
    }

    pub fn with_updater(mut self, updater: impl Updater + 'static) -> Self {
        self.updater = Some(Arc::new(updater));
        self
    }

    /// Share a job queue with the code that dispatches PDF jobs
    pub fn with_job_queue(mut self, jobs: JobQueue) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_upgrade_runner(mut self, runner: UpgradeRunner) -> Self {
        self.upgrades = Some(runner);
        self
    }

    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes do not pass through the authenticate middleware.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Assemble the shared state, filling in defaults
    pub fn build_state(&mut self) -> AppState {
        let config = self.config.take().unwrap_or_default();
        let temp_root = config.local_disk_root().to_string();

        let directory = InMemoryDirectory::new();
        let authenticator = self
            .authenticator
            .take()
            .unwrap_or_else(|| Arc::new(directory.clone()));
        let users = self
            .users
            .take()
            .unwrap_or_else(|| Arc::new(directory.clone()));
        let companies = self
            .companies
            .take()
            .unwrap_or_else(|| Arc::new(directory));

        AppState {
            config: Arc::new(config),
            gate: self.gate.take().unwrap_or_else(|| Arc::new(AbilityGate)),
            authenticator,
            settings: self
                .settings
                .take()
                .unwrap_or_else(|| Arc::new(InMemorySettingsStore::new())),
            currencies: self
                .currencies
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryCurrencyStore::new())),
            catalog: self
                .catalog
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryCatalogStore::new())),
            users,
            companies,
            disks: self
                .disks
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryDiskStore::new())),
            modules: self
                .modules
                .take()
                .unwrap_or_else(|| Arc::new(LocalModuleInstaller::new(temp_root.clone()))),
            updater: self
                .updater
                .take()
                .unwrap_or_else(|| Arc::new(LocalUpdater::new(temp_root))),
            jobs: self.jobs.take().unwrap_or_default(),
            upgrades: Arc::new(self.upgrades.take().unwrap_or_default()),
        }
    }

    /// Build the final router
    ///
    /// Custom routes are merged last; every route is traced.
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state();
        let mut app = build_router(state);

        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        if let Some(cors) = self.cors.take() {
            app = app.layer(cors);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scope;

    // ── Constructor tests ────────────────────────────────────────────────

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.config.is_none());
        assert!(builder.gate.is_none());
        assert!(builder.settings.is_none());
        assert!(builder.custom_routes.is_empty());
        assert!(builder.cors.is_none());
    }

    #[test]
    fn test_default_is_same_as_new() {
        let builder = ServerBuilder::default();
        assert!(builder.config.is_none());
        assert!(builder.authenticator.is_none());
        assert!(builder.custom_routes.is_empty());
    }

    // ── with_* ───────────────────────────────────────────────────────────

    #[test]
    fn test_with_directory_sets_three_collaborators() {
        let builder = ServerBuilder::new().with_directory(InMemoryDirectory::new());
        assert!(builder.authenticator.is_some());
        assert!(builder.users.is_some());
        assert!(builder.companies.is_some());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    // ── build_state ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_build_state_uses_given_stores() {
        let settings = InMemorySettingsStore::new();
        settings
            .set_setting("version", "3.0.0", Scope::Global)
            .await
            .unwrap();

        let state = ServerBuilder::new()
            .with_settings_store(settings)
            .build_state();

        assert_eq!(
            state.settings.get_setting("version", Scope::Global).await.unwrap(),
            Some("3.0.0".to_string())
        );
        assert_eq!(
            state.upgrades.versions(),
            vec!["1.1.0", "2.0.0", "2.0.1", "2.1.0", "3.0.0"]
        );
    }

    #[tokio::test]
    async fn test_build_state_defaults_are_empty() {
        let state = ServerBuilder::new().build_state();

        assert!(state.disks.list().await.unwrap().is_empty());
        assert!(state.jobs.is_empty().await);
        assert!(state.authenticator.authenticate("nope").await.unwrap().is_none());
        assert_eq!(state.config.default_disk(), "local");
    }

    #[test]
    fn test_build_returns_router() {
        let result = ServerBuilder::new()
            .with_cors(CorsLayer::permissive())
            .with_custom_routes(Router::new())
            .build();
        assert!(result.is_ok());
    }
}

//! Route table
//!
//! ```text
//! /health, /healthz                      liveness
//! /api/cron                              cron token guard
//! /api/v1/...                            authenticate + company scope
//! /api/v1/installation/...               closed once installed
//! ```

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};

use super::middleware::{authenticate, company_scope, cron_token, redirect_if_installed};
use super::state::AppState;
use crate::handlers::{cron, disks, health, installation, mail, modules, settings, update};

/// Authenticated application routes, relative to `/api/v1`
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Self-update
        .route("/check/update", get(update::check_update))
        .route("/update/download", post(update::download_update))
        .route("/update/unzip", post(update::unzip_update))
        .route("/update/copy", post(update::copy_update))
        .route("/update/delete", post(update::delete_files))
        .route("/update/migrate", post(update::migrate_update))
        .route("/update/finish", post(update::finish_update))
        // Modules
        .route("/modules/check", post(modules::check_token))
        .route("/modules/download", post(modules::download_module))
        .route("/modules/unzip", post(modules::unzip_module))
        .route("/modules/copy", post(modules::copy_module))
        .route("/modules/complete", post(modules::complete_module))
        // Settings
        .route(
            "/settings",
            get(settings::get_setting).post(settings::update_settings),
        )
        .route(
            "/company/settings",
            get(settings::get_company_settings).post(settings::update_company_settings),
        )
        .route("/company/has-transactions", get(settings::has_transactions))
        // Mail
        .route("/mail/drivers", get(mail::mail_drivers))
        .route(
            "/mail/config",
            get(mail::get_mail_config).post(mail::save_mail_config),
        )
        .route("/company/mail/config", get(mail::get_company_mail_config))
        // Disks
        .route("/disks/drivers", get(disks::disk_drivers))
        .route("/disks", get(disks::list_disks).post(disks::create_disk))
        .route(
            "/disks/{disk}",
            get(disks::show_disk)
                .put(disks::update_disk)
                .delete(disks::delete_disk),
        )
        .route("/backup/disks", get(disks::backup_disks))
        .merge(installation_routes(state))
        .layer(from_fn(company_scope))
        .layer(from_fn_with_state(state.clone(), authenticate))
}

/// Setup wizard, closed once installation has completed
fn installation_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/installation/database/config",
            get(installation::get_database_config).post(installation::save_database_config),
        )
        .route_layer(from_fn_with_state(state.clone(), redirect_if_installed))
}

fn cron_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/cron", post(cron::run_cron))
        .route_layer(from_fn_with_state(state.clone(), cron_token))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/healthz", get(health::health_check))
}

/// Every route of the application, with state applied
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(cron_routes(&state))
        .nest("/api/v1", api_routes(&state))
        .with_state(state)
}

//! Core traits and types shared by handlers, policies and upgrade steps

pub mod auth;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod service;
pub mod settings;
pub mod validation;
pub mod version;

pub use auth::{Authenticator, CurrentUser, NoAuthenticator};
pub use error::{AppError, AppResult, RequestError, ValidationError};
pub use extractors::CompanyScope;
pub use gate::{AbilityGate, Gate};
pub use service::{CatalogStore, CompanyDirectory, CurrencyStore, DiskStore, UserDirectory};
pub use settings::{Scope, SettingsStore};

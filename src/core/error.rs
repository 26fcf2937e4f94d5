//! Typed error handling for the invoicing API
//!
//! Handlers return [`AppResult`]; every error knows its HTTP status and a
//! stable error code, so the outer router never has to guess.
//!
//! # Error Categories
//!
//! - [`RequestError`]: authentication, authorization and lookup failures
//! - [`ValidationError`]: form-request validation failures (422)
//! - [`UpgradeError`]: version-gated data migrations
//! - [`InstallerError`]: module / update installer failures
//!
//! # Example
//!
//! ```rust,ignore
//! use invoicer::prelude::*;
//!
//! async fn show(user: Option<User>) -> AppResult<Json<Value>> {
//!     let user = user.ok_or(RequestError::Unauthorized {
//!         message: "Unauthenticated.".to_string(),
//!     })?;
//!     Ok(Json(json!({ "id": user.id })))
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::installer::InstallerError;
use crate::upgrades::UpgradeError;

/// The main error type of the application layer
#[derive(Debug)]
pub enum AppError {
    /// Authentication / authorization / lookup errors
    Request(RequestError),

    /// Form-request validation errors
    Validation(ValidationError),

    /// Upgrade listener errors
    Upgrade(UpgradeError),

    /// Module or update installer errors
    Installer(InstallerError),

    /// Store or collaborator failures that should not happen in normal operation
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Request(e) => write!(f, "{}", e),
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Upgrade(e) => write!(f, "{}", e),
            AppError::Installer(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Request(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Upgrade(e) => Some(e),
            AppError::Installer(e) => Some(e),
            AppError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<IndexMap<String, Vec<String>>>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Request(e) => e.status_code(),
            AppError::Validation(e) => e.status_code(),
            AppError::Upgrade(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Installer(e) => e.status_code(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Request(e) => e.error_code(),
            AppError::Validation(e) => e.error_code(),
            AppError::Upgrade(_) => "UPGRADE_FAILED",
            AppError::Installer(e) => e.error_code(),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let errors = match self {
            AppError::Validation(ValidationError::FieldErrors(errors)) => Some(errors.clone()),
            _ => None,
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while authenticating, authorizing or resolving a request
#[derive(Debug)]
pub enum RequestError {
    /// No authenticated user, or a token mismatch
    Unauthorized { message: String },

    /// The gate denied an ability
    Forbidden { ability: String },

    /// The addressed resource does not exist
    NotFound { resource: String, id: String },

    /// A header the handler depends on is absent or malformed
    MissingHeader { header: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RequestError::Forbidden { ability } => {
                write!(f, "This action is unauthorized ({})", ability)
            }
            RequestError::NotFound { resource, id } => {
                write!(f, "{} with id '{}' not found", resource, id)
            }
            RequestError::MissingHeader { header } => {
                write!(f, "Missing required header: {}", header)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::MissingHeader { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::NotFound { .. } => "NOT_FOUND",
            RequestError::MissingHeader { .. } => "MISSING_HEADER",
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        AppError::Request(err)
    }
}

/// Lets extractors reject with a bare `RequestError`
impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Messages keyed by field name, in rule order
    FieldErrors(IndexMap<String, Vec<String>>),

    /// Body was not valid JSON
    InvalidJson { message: String },
}

impl ValidationError {
    /// Single-field convenience constructor
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = IndexMap::new();
        errors.insert(field.into(), vec![message.into()]);
        ValidationError::FieldErrors(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::FieldErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ValidationError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let fields: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
                write!(f, "The given data was invalid: {}", fields.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();
        for (field, field_errors) in errs.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is {}.", field, e.code),
                })
                .collect();
            errors.insert(field.to_string(), messages);
        }
        errors.sort_keys();
        AppError::Validation(ValidationError::FieldErrors(errors))
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<UpgradeError> for AppError {
    fn from(err: UpgradeError) -> Self {
        AppError::Upgrade(err)
    }
}

impl From<InstallerError> for AppError {
    fn from(err: InstallerError) -> Self {
        AppError::Installer(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

/// Store traits return `anyhow::Result`; anything reaching a handler that way is internal
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// A specialized Result type for handlers and services
pub type AppResult<T> = Result<T, AppError>;

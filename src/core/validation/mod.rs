//! Declarative request validation
//!
//! Rule tables are plain ordered maps built per request; the extractor
//! applies them and trims the payload to the validated fields.

pub mod extractor;
pub mod filters;
pub mod requests;
pub mod rules;
pub mod validators;

pub use extractor::{Validated, parse_body, validate_value};
pub use requests::{
    DatabaseEnvironmentRequest, DiskEnvironmentRequest, FormRequest, MailEnvironmentRequest,
    SettingsRequest,
};
pub use rules::{Constraint, RuleSet};

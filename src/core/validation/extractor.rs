//! Axum extractor for form requests
//!
//! `Validated<R>` parses the JSON body, picks the rule table of the form
//! request `R` from the payload itself and rejects with a 422 before the
//! handler runs. Fixed-shape bodies described by a `validator` derive go
//! through [`parse_body`] and [`validate_value`] once the caller is known.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use validator::Validate;

use super::filters::only_validated;
use super::requests::FormRequest;
use crate::core::error::{AppError, ValidationError};

/// Validated payload of form request `R`
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn save_mail_config(
///     Validated(payload, _): Validated<MailEnvironmentRequest>,
/// ) -> AppResult<Json<Value>> {
///     // only the fields named by the mail rules are left in `payload`
/// }
/// ```
pub struct Validated<R>(pub Map<String, Value>, pub PhantomData<R>);

impl<R> Validated<R> {
    pub fn new(payload: Map<String, Value>) -> Self {
        Self(payload, PhantomData)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl<R> std::ops::Deref for Validated<R> {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, R> FromRequest<S> for Validated<R>
where
    S: Send + Sync,
    R: FormRequest,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            AppError::Validation(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;

        let rules = R::rules(&payload);
        rules.validate(&payload)?;

        Ok(Validated::new(only_validated(&payload, &rules)))
    }
}

/// Deserialize and validate an already parsed payload
///
/// Bodies default their fields so absent keys are reported by `validate`.
pub fn validate_value<T>(payload: Value) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let body: T = serde_json::from_value(payload)?;
    body.validate()?;
    Ok(body)
}

/// Parse a raw body; an empty body is an empty object
///
/// For handlers that must check the caller before looking at the input.
pub fn parse_body(bytes: &[u8]) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Validate)]
    #[serde(default)]
    struct PathBody {
        #[validate(length(min = 1, message = "The path field is required."))]
        path: String,
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
        assert_eq!(parse_body(br#"{"path":"/tmp"}"#).unwrap(), json!({ "path": "/tmp" }));
        assert!(matches!(
            parse_body(b"{"),
            Err(AppError::Validation(ValidationError::InvalidJson { .. }))
        ));
    }

    #[test]
    fn test_validate_value_reports_missing_field() {
        let err = validate_value::<PathBody>(json!({})).unwrap_err();
        match err {
            AppError::Validation(ValidationError::FieldErrors(errors)) => {
                assert_eq!(errors["path"], vec!["The path field is required.".to_string()]);
            }
            other => panic!("expected field errors, got {:?}", other),
        }

        let body = validate_value::<PathBody>(json!({ "path": "/tmp/u.zip" })).unwrap();
        assert_eq!(body.path, "/tmp/u.zip");
    }
}

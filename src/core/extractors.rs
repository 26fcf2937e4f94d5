//! Axum extractors for the company scope of a request
//!
//! The company scope middleware has already normalised the `company`
//! header by the time handlers run; these helpers only read it.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::core::error::RequestError;
use crate::entities::CompanyId;

/// Header carrying the company a request acts on
pub const COMPANY_HEADER: &str = "company";

/// Header carrying the cron shared secret
pub const CRON_TOKEN_HEADER: &str = "x-authorization-token";

/// Parse the `company` header
pub fn extract_company_id(headers: &HeaderMap) -> Option<CompanyId> {
    headers
        .get(COMPANY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Company the request is scoped to
///
/// Rejects with 400 when the header is absent or not a company id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyScope(pub CompanyId);

impl<S> FromRequestParts<S> for CompanyScope
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_company_id(&parts.headers)
            .map(CompanyScope)
            .ok_or_else(|| RequestError::MissingHeader {
                header: COMPANY_HEADER.to_string(),
            })
    }
}

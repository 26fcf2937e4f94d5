//! Request authentication
//!
//! An [`Authenticator`] turns a bearer token into a [`User`]. The
//! authenticate middleware stores the result in the request extensions;
//! handlers read it back through [`CurrentUser`] and decide for themselves
//! what an anonymous request may do.

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use std::convert::Infallible;

use crate::core::error::RequestError;
use crate::entities::User;

/// Resolves API tokens to users
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` for unknown tokens
    async fn authenticate(&self, token: &str) -> Result<Option<User>>;
}

/// Authenticator that knows nobody (every request stays anonymous)
pub struct NoAuthenticator;

#[async_trait]
impl Authenticator for NoAuthenticator {
    async fn authenticate(&self, _token: &str) -> Result<Option<User>> {
        Ok(None)
    }
}

/// Extract `Bearer <token>` from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The user attached by the authenticate middleware, if any
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Require an authenticated user
    pub fn require(&self) -> Result<&User, RequestError> {
        self.0.as_ref().ok_or_else(|| RequestError::Unauthorized {
            message: "Unauthenticated.".to_string(),
        })
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<User>().cloned()))
    }
}

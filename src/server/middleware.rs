//! Request guards
//!
//! - [`authenticate`] attaches the [`User`] behind a bearer token, if any
//! - [`company_scope`] points the `company` header at a company the user
//!   belongs to
//! - [`cron_token`] lets a request through only with the configured shared
//!   secret
//! - [`redirect_if_installed`] closes the installation wizard once setup
//!   has completed

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use super::state::AppState;
use crate::core::auth::bearer_token;
use crate::core::error::AppError;
use crate::core::extractors::{COMPANY_HEADER, CRON_TOKEN_HEADER, extract_company_id};
use crate::core::settings::Scope;
use crate::entities::User;

/// Resolve the bearer token and store the user in the request extensions
///
/// Unknown or missing tokens leave the request anonymous; handlers decide
/// what anonymous callers may do.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match bearer_token(request.headers()) {
        Some(token) => state.authenticator.authenticate(token).await?,
        None => None,
    };

    if let Some(user) = user {
        tracing::debug!(user_id = user.id, "request authenticated");
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Rewrite the `company` header to the user's first company when it is
/// missing or names a company the user does not belong to
pub async fn company_scope(mut request: Request, next: Next) -> Response {
    let fallback = request.extensions().get::<User>().and_then(|user| {
        let first = user.first_company()?;
        match extract_company_id(request.headers()) {
            Some(company) if user.has_company(company) => None,
            _ => Some(first),
        }
    });

    if let Some(company) = fallback {
        tracing::debug!(company, "company header rewritten");
        request
            .headers_mut()
            .insert(COMPANY_HEADER, HeaderValue::from(company));
    }

    next.run(request).await
}

/// Compare `x-authorization-token` with the configured cron secret
///
/// An unset or empty secret rejects every request.
pub async fn cron_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = state.config.cron_auth_token();
    let provided = request
        .headers()
        .get(CRON_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match (expected, provided) {
        (Some(expected), Some(provided)) if expected == provided => next.run(request).await,
        _ => {
            tracing::warn!(uri = %request.uri(), "cron token rejected");
            (StatusCode::UNAUTHORIZED, Json(json!(["unauthorized"]))).into_response()
        }
    }
}

/// Send the caller to `/login` once `profile_complete` is `COMPLETED`
///
/// Unset, empty or numeric progress values leave the wizard open.
pub async fn redirect_if_installed(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let progress = state
        .settings
        .get_setting("profile_complete", Scope::Global)
        .await?;

    if progress.as_deref() == Some("COMPLETED") {
        tracing::warn!(uri = %request.uri(), "installation already completed");
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::routing::get;
    use axum_test::TestServer;

    async fn echo_company(request: Request) -> String {
        request
            .headers()
            .get(COMPANY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string()
    }

    /// Inserts a fixed user the way `authenticate` would
    fn with_user(user: Option<User>) -> Router {
        Router::new()
            .route("/", get(echo_company))
            .layer(axum::middleware::from_fn(company_scope))
            .layer(axum::middleware::from_fn(
                move |mut request: Request, next: Next| {
                    let user = user.clone();
                    async move {
                        if let Some(user) = user {
                            request.extensions_mut().insert(user);
                        }
                        next.run(request).await
                    }
                },
            ))
    }

    fn member() -> User {
        User::new(1, "Ada", "ada@example.com", crate::entities::Role::Member)
            .with_company(4)
            .with_company(9)
    }

    #[tokio::test]
    async fn test_missing_header_gets_first_company() {
        let server = TestServer::new(with_user(Some(member())));
        server.get("/").await.assert_text("4");
    }

    #[tokio::test]
    async fn test_foreign_company_is_replaced() {
        let server = TestServer::new(with_user(Some(member())));
        server
            .get("/")
            .add_header(COMPANY_HEADER, "77")
            .await
            .assert_text("4");
    }

    #[tokio::test]
    async fn test_own_company_is_kept() {
        let server = TestServer::new(with_user(Some(member())));
        server
            .get("/")
            .add_header(COMPANY_HEADER, "9")
            .await
            .assert_text("9");
    }

    #[tokio::test]
    async fn test_anonymous_and_companyless_pass_through() {
        let server = TestServer::new(with_user(None));
        server.get("/").await.assert_text("none");

        let loner = User::new(2, "Bob", "bob@example.com", crate::entities::Role::Member);
        let server = TestServer::new(with_user(Some(loner)));
        server
            .get("/")
            .add_header(COMPANY_HEADER, "77")
            .await
            .assert_text("77");
    }
}

//! Request authentication with silent rolling renewal.
//!
//! `authenticate` runs as a layer rather than an extractor because renewal
//! has to touch the response: when a valid access token is close to expiry
//! the middleware mints a replacement and returns it in the `new-token`
//! header, so active clients never see an expiry as long as they adopt the
//! replacement.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use super::routes::ApiState;
use crate::repository::{Account, AccountRepository, TokenLedger};
use crate::token::Claims;
use crate::{AuthError, Mailer};

/// Response header carrying a silently renewed access token.
pub const NEW_TOKEN_HEADER: &str = "new-token";

/// The authenticated identity, inserted into request extensions by
/// [`authenticate`] and read back by handlers and [`super::RoleGuard`].
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account: Account,
    pub claims: Claims,
}

impl CurrentAccount {
    pub fn into_inner(self) -> Account {
        self.account
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAccount>()
            .cloned()
            .ok_or(ApiError(AuthError::Unauthorized))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// Verifies the bearer access token, loads the account, and renews the
/// token in-flight when its remaining lifetime drops below the configured
/// threshold.
///
/// Expired tokens fail with the `TOKEN_EXPIRED` code so clients know to
/// call the refresh endpoint instead of re-authenticating.
pub async fn authenticate<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let token =
        extract_bearer_token(request.headers()).ok_or(ApiError(AuthError::Unauthorized))?;

    let claims = state.signer.verify_access(&token)?;

    let account = state
        .accounts
        .find_by_id(claims.account_id()?)
        .await?
        .ok_or(ApiError(AuthError::Unauthorized))?;

    let renewed = if claims.remaining() < state.config.renew_threshold {
        Some(state.signer.sign_access(&account)?)
    } else {
        None
    };

    request
        .extensions_mut()
        .insert(CurrentAccount { account, claims });

    let mut response = next.run(request).await;

    if let Some(new_token) = renewed {
        if let Ok(value) = HeaderValue::from_str(&new_token) {
            response.headers_mut().insert(NEW_TOKEN_HEADER, value);
        }
    }

    Ok(response)
}

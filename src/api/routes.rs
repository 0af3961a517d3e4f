use axum::routing::{get, post};
use axum::Router;

use super::{handlers, middleware};
use crate::config::SessionConfig;
use crate::repository::{AccountRepository, TokenLedger};
use crate::token::TokenSigner;
use crate::Mailer;

/// Shared state behind every handler. Repositories are generic so the same
/// router serves the SQLite backend and the in-memory mocks.
#[derive(Clone)]
pub struct ApiState<A, L, M> {
    pub accounts: A,
    pub ledger: L,
    pub mailer: M,
    pub signer: TokenSigner,
    pub config: SessionConfig,
}

/// Builds the full `/auth` router over the given state.
///
/// `/me` and `/logout` sit behind the authentication layer; everything else
/// is reachable without a token.
pub fn router<A, L, M>(state: ApiState<A, L, M>) -> Router
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route("/logout", post(handlers::logout::<A, L, M>))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate::<A, L, M>,
        ));

    let public = Router::new()
        .route("/register", post(handlers::register::<A, L, M>))
        .route("/login", post(handlers::login::<A, L, M>))
        .route("/refresh-token", post(handlers::refresh_token::<A, L, M>))
        .route("/verify-email/{token}", get(handlers::verify_email::<A, L, M>))
        .route(
            "/resend-verification",
            post(handlers::resend_verification::<A, L, M>),
        )
        .route("/forgot-password", post(handlers::forgot_password::<A, L, M>))
        .route(
            "/reset-password/{token}",
            post(handlers::reset_password::<A, L, M>),
        );

    Router::new()
        .nest("/auth", public.merge(protected))
        .with_state(state)
}

//! HTTP handlers, one per credential flow.
//!
//! Handlers stay thin: deserialize, run the action, wrap the result in the
//! response envelope. Status mapping for failures lives in
//! [`super::error::ApiError`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::ApiError;
use super::middleware::CurrentAccount;
use super::routes::ApiState;
use super::types::{
    AccountResponse, ApiResponse, AuthData, ForgotPasswordRequest, LoginRequest, LogoutRequest,
    RefreshTokenRequest, RegisterRequest, ResendVerificationRequest, ResetPasswordRequest,
};
use crate::actions::{
    ForgotPasswordAction, LoginAction, LogoutAction, RefreshAction, RegisterAction,
    ResendVerificationAction, ResetPasswordAction, VerifyEmailAction,
};
use crate::repository::{AccountRepository, TokenLedger};
use crate::{Mailer, SecretString};

/// POST /auth/register
pub async fn register<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = RegisterAction::new(
        state.accounts,
        state.ledger,
        state.mailer,
        state.signer,
        state.config,
    );
    let password = SecretString::new(&body.password);

    let account = action
        .execute(&body.email, &body.first_name, &body.last_name, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::data(AccountResponse::from(account)).with_message(
                "Registration successful. Please check your email to verify your account",
            ),
        ),
    ))
}

/// POST /auth/login
pub async fn login<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = LoginAction::new(state.accounts, state.ledger, state.signer);
    let password = SecretString::new(&body.password);

    let (account, tokens) = action.execute(&body.email, &password).await?;

    Ok(Json(ApiResponse::data(AuthData {
        account: AccountResponse::from(account),
        tokens,
    })))
}

/// POST /auth/logout
pub async fn logout<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    _current: CurrentAccount,
    Json(body): Json<LogoutRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = LogoutAction::new(state.ledger);
    action.execute(&body.refresh_token).await?;

    Ok(Json(ApiResponse::message("Successfully logged out")))
}

/// POST /auth/refresh-token
pub async fn refresh_token<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = RefreshAction::new(state.accounts, state.ledger, state.signer);

    let (account, tokens) = action.execute(&body.refresh_token).await?;

    Ok(Json(ApiResponse::data(AuthData {
        account: AccountResponse::from(account),
        tokens,
    })))
}

/// GET /auth/verify-email/{token}
pub async fn verify_email<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = VerifyEmailAction::new(state.accounts, state.ledger, state.signer);
    action.execute(&token).await?;

    Ok(Json(ApiResponse::message("Email verified successfully")))
}

/// POST /auth/resend-verification
pub async fn resend_verification<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Json(body): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ResendVerificationAction::new(
        state.accounts,
        state.ledger,
        state.mailer,
        state.signer,
        state.config,
    );
    action.execute(&body.email).await?;

    // Same body whether or not the address has an unverified account
    Ok(Json(ApiResponse::message(
        "If the email exists, a verification link has been sent",
    )))
}

/// POST /auth/forgot-password
pub async fn forgot_password<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> impl IntoResponse
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ForgotPasswordAction::new(
        state.accounts,
        state.ledger,
        state.mailer,
        state.signer,
        state.config,
    );

    // The success body never reveals whether the account exists, even when
    // the mailer fails
    if let Err(err) = action.execute(&body.email).await {
        tracing::warn!(error = %err, "forgot-password flow failed");
    }

    Json(ApiResponse::message(
        "If the email exists, a password reset link has been sent",
    ))
}

/// POST /auth/reset-password/{token}
pub async fn reset_password<A, L, M>(
    State(state): State<ApiState<A, L, M>>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    A: AccountRepository + Clone + Send + Sync + 'static,
    L: TokenLedger + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ResetPasswordAction::new(state.accounts, state.ledger, state.signer);
    let password = SecretString::new(&body.password);

    action.execute(&token, &password).await?;

    Ok(Json(ApiResponse::message(
        "Password has been reset successfully",
    )))
}

/// GET /auth/me
pub async fn me(current: CurrentAccount) -> impl IntoResponse {
    Json(ApiResponse::data(AccountResponse::from(
        current.into_inner(),
    )))
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::AuthError;

/// Error body shared by every failing endpoint.
///
/// `code` is a stable machine-readable string; clients key on
/// `TOKEN_EXPIRED` to trigger a refresh instead of a logout.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: String,
}

/// Converts `AuthError` into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::AccountExists => "ACCOUNT_EXISTS",
        AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
        AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
        AuthError::NotVerified => "NOT_VERIFIED",
        AuthError::AlreadyVerified => "ALREADY_VERIFIED",
        AuthError::TokenExpired => "TOKEN_EXPIRED",
        AuthError::TokenInvalid => "TOKEN_INVALID",
        AuthError::WrongPurpose => "WRONG_PURPOSE",
        AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
        AuthError::DuplicateToken => "DUPLICATE_TOKEN",
        AuthError::Unauthorized => "UNAUTHORIZED",
        AuthError::Forbidden => "FORBIDDEN",
        AuthError::Validation(_) => "VALIDATION_ERROR",
        AuthError::PasswordHashError
        | AuthError::ConfigurationError(_)
        | AuthError::DatabaseError(_)
        | AuthError::MailerError(_) => "INTERNAL_ERROR",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuthError::Validation(_) | AuthError::AlreadyVerified | AuthError::WrongPurpose => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials
            | AuthError::NotVerified
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::InvalidRefreshToken
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::AccountExists | AuthError::DuplicateToken => StatusCode::CONFLICT,
            AuthError::PasswordHashError
            | AuthError::ConfigurationError(_)
            | AuthError::DatabaseError(_)
            | AuthError::MailerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details are logged, never returned to the caller
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "Internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            success: false,
            message,
            code: error_code(&self.0).to_owned(),
        };

        (status, Json(body)).into_response()
    }
}

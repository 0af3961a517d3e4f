//! Token-based session lifecycle management.
//!
//! `sessiongate` handles the credential-action flows of a multi-tenant web
//! backend: registration, login, logout, refresh-token rotation, email
//! verification and password reset. Access tokens are short-lived JWTs that
//! are never persisted; refresh, verification and reset tokens are recorded
//! in a persisted ledger so they can be revoked and are single-use.
//!
//! Storage is abstracted behind [`AccountRepository`] and [`TokenLedger`];
//! enable the `sqlx_sqlite` feature for the SQLite backend or the `mocks`
//! feature for in-memory implementations.

pub mod actions;
pub mod api;
pub mod config;
pub mod crypto;
pub mod mailer;
pub mod repository;
#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;
pub mod token;
pub mod validators;

pub use config::{SessionConfig, SignerConfig};
pub use crypto::SecretString;
pub use mailer::Mailer;
pub use repository::{Account, AccountRepository, IssuedToken, Role, TokenLedger, TokenPurpose};
pub use token::{Claims, TokenKind, TokenPair, TokenSigner};

#[cfg(any(test, feature = "mocks"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockAccountRepository, MockTokenLedger};

use std::fmt;

/// Errors produced by the session core.
///
/// Domain failures carry a human-readable message; the HTTP layer maps each
/// variant to a status code and a machine-readable code string.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// An account with this email already exists.
    AccountExists,
    /// No account matched the given id or email.
    AccountNotFound,
    /// Email/password pair did not match. Deliberately identical for
    /// unknown-email and wrong-password so callers cannot enumerate users.
    InvalidCredentials,
    /// The account exists but its email has not been verified.
    NotVerified,
    /// Verification attempted on an already-verified account.
    AlreadyVerified,
    /// Token signature valid but its expiry has elapsed.
    TokenExpired,
    /// Malformed token or bad signature.
    TokenInvalid,
    /// Token is valid but was issued for a different purpose.
    WrongPurpose,
    /// Refresh token absent from the ledger, expired, or lost a rotation race.
    InvalidRefreshToken,
    /// Ledger uniqueness violation on a token value.
    DuplicateToken,
    /// No identity attached to the request.
    Unauthorized,
    /// Identity present but lacks the required role.
    Forbidden,
    /// Malformed input.
    Validation(String),
    PasswordHashError,
    ConfigurationError(String),
    DatabaseError(String),
    MailerError(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AccountExists => write!(f, "An account with this email already exists"),
            AuthError::AccountNotFound => write!(f, "Account not found"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::NotVerified => write!(f, "Please verify your email before logging in"),
            AuthError::AlreadyVerified => write!(f, "Email is already verified"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::WrongPurpose => write!(f, "Token was issued for a different purpose"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid or expired refresh token"),
            AuthError::DuplicateToken => write!(f, "Token value already exists"),
            AuthError::Unauthorized => write!(f, "Authentication required"),
            AuthError::Forbidden => write!(f, "You do not have permission to perform this action"),
            AuthError::Validation(msg) => write!(f, "{msg}"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            AuthError::MailerError(msg) => write!(f, "Mailer error: {msg}"),
        }
    }
}

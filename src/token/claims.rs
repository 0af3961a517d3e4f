use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Role;
use crate::AuthError;

/// What a signed token authorizes, carried in the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on every authenticated request.
    Access,
    /// Long-lived, ledger-backed credential exchanged for a new pair.
    Refresh,
    /// One-time email verification link.
    Verification,
    /// One-time password reset link.
    PasswordReset,
}

/// Claims embedded in a signed token.
///
/// Access tokens carry email and roles so the role gate can run without a
/// store lookup; refresh and purpose tokens carry only the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the account id.
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub roles: Option<Vec<Role>>,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Random token id, making tokens minted in the same second distinct.
    pub jti: String,
    #[serde(rename = "typ")]
    pub kind: TokenKind,
}

impl Claims {
    /// The account id from the subject claim.
    pub fn account_id(&self) -> Result<i32, AuthError> {
        self.sub.parse().map_err(|_| AuthError::TokenInvalid)
    }

    /// Absolute expiry of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Lifetime left before expiry; negative once elapsed.
    pub fn remaining(&self) -> Duration {
        self.expires_at() - Utc::now()
    }

    pub fn is_access(&self) -> bool {
        self.kind == TokenKind::Access
    }

    pub fn is_refresh(&self) -> bool {
        self.kind == TokenKind::Refresh
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// What a ledger row authorizes. At most one Verification and one Reset row
/// is live per owner; Refresh rows are one per device/session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Refresh,
    Verification,
    Reset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::Verification => "verification",
            TokenPurpose::Reset => "reset",
        }
    }
}

impl std::str::FromStr for TokenPurpose {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refresh" => Ok(TokenPurpose::Refresh),
            "verification" => Ok(TokenPurpose::Verification),
            "reset" => Ok(TokenPurpose::Reset),
            other => Err(AuthError::DatabaseError(format!(
                "unknown token purpose: {other}"
            ))),
        }
    }
}

/// One outstanding refresh/verification/reset token.
///
/// `token` holds the original signed value as presented by the caller;
/// persisted backends key rows on a hash of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub owner_id: i32,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Durable record of outstanding tokens, making them revocable and
/// single-use. Short-lived access tokens are deliberately not recorded here.
#[async_trait]
pub trait TokenLedger {
    /// Inserts a row. Fails `DuplicateToken` if the token value already
    /// exists (a store-level uniqueness violation).
    async fn create(
        &self,
        owner_id: i32,
        token: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError>;

    /// Returns the row if present and unexpired. Expired rows are reported
    /// as absent even before [`TokenLedger::prune_expired`] removes them.
    async fn find_active(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<IssuedToken>, AuthError>;

    /// Deletes the row so the token cannot be replayed. Idempotent: deleting
    /// an already-absent row is not an error.
    async fn consume(&self, token: &str) -> Result<(), AuthError>;

    /// Atomically replaces the token value and expiry of an existing,
    /// unexpired row, preserving owner and purpose. Fails
    /// `InvalidRefreshToken` when the old row is already gone, which makes
    /// the second of two concurrent rotations fail instead of both
    /// succeeding.
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError>;

    /// Deletes all rows for an owner and purpose, returning the count.
    /// Called before issuing a new verification/reset token so only the
    /// latest link stays usable.
    async fn revoke_for_owner(
        &self,
        owner_id: i32,
        purpose: TokenPurpose,
    ) -> Result<u64, AuthError>;

    /// Removes expired rows. SQLite has no native TTL index, so expiry is
    /// otherwise only enforced by `find_active`.
    async fn prune_expired(&self) -> Result<u64, AuthError>;
}

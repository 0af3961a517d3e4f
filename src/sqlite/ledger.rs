use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::crypto::hash_token;
use crate::repository::{IssuedToken, TokenLedger, TokenPurpose};
use crate::AuthError;

/// Ledger rows are keyed on a sha256 of the token, never the token itself.
#[derive(Clone)]
pub struct SqliteTokenLedger {
    pool: SqlitePool,
}

impl SqliteTokenLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LedgerRecord {
    owner_id: i64,
    purpose: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl LedgerRecord {
    fn into_issued_token(self, plain_token: &str) -> Result<IssuedToken, AuthError> {
        Ok(IssuedToken {
            token: plain_token.to_owned(),
            owner_id: self.owner_id as i32,
            purpose: self.purpose.parse()?,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl TokenLedger for SqliteTokenLedger {
    #[tracing::instrument(skip(self, token), err)]
    async fn create(
        &self,
        owner_id: i32,
        token: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let token_hash = hash_token(token);

        let row: LedgerRecord = sqlx::query_as(
            "INSERT INTO issued_tokens (token_hash, owner_id, purpose, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING owner_id, purpose, expires_at, created_at",
        )
        .bind(&token_hash)
        .bind(owner_id)
        .bind(purpose.as_str())
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AuthError::DuplicateToken;
            }
            tracing::error!(operation = "create", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.into_issued_token(token)
    }

    #[tracing::instrument(skip(self, token), err)]
    async fn find_active(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<IssuedToken>, AuthError> {
        let token_hash = hash_token(token);

        let row: Option<LedgerRecord> = sqlx::query_as(
            "SELECT owner_id, purpose, expires_at, created_at
             FROM issued_tokens
             WHERE token_hash = ? AND purpose = ? AND expires_at > ?",
        )
        .bind(&token_hash)
        .bind(purpose.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(operation = "find_active", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.map(|r| r.into_issued_token(token)).transpose()
    }

    #[tracing::instrument(skip(self, token), err)]
    async fn consume(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = hash_token(token);

        sqlx::query("DELETE FROM issued_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(operation = "consume", error = %e, "database error");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[tracing::instrument(skip(self, old_token, new_token), err)]
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let old_hash = hash_token(old_token);
        let new_hash = hash_token(new_token);

        // A single conditional UPDATE so two concurrent rotations of the same
        // token cannot both succeed; the loser matches zero rows.
        let row: Option<LedgerRecord> = sqlx::query_as(
            "UPDATE issued_tokens SET token_hash = ?, expires_at = ?
             WHERE token_hash = ? AND expires_at > ?
             RETURNING owner_id, purpose, expires_at, created_at",
        )
        .bind(&new_hash)
        .bind(new_expires_at)
        .bind(&old_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(operation = "rotate", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.ok_or(AuthError::InvalidRefreshToken)?
            .into_issued_token(new_token)
    }

    #[tracing::instrument(skip(self), err)]
    async fn revoke_for_owner(
        &self,
        owner_id: i32,
        purpose: TokenPurpose,
    ) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM issued_tokens WHERE owner_id = ? AND purpose = ?")
            .bind(owner_id)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(operation = "revoke_for_owner", error = %e, "database error");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), err)]
    async fn prune_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM issued_tokens WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(operation = "prune_expired", error = %e, "database error");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use super::ledger::{IssuedToken, TokenLedger, TokenPurpose};
use crate::AuthError;

/// In-memory token ledger for tests. Clones share the same storage.
#[derive(Clone)]
pub struct MockTokenLedger {
    pub rows: Arc<Mutex<Vec<IssuedToken>>>,
}

impl MockTokenLedger {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl Default for MockTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenLedger for MockTokenLedger {
    async fn create(
        &self,
        owner_id: i32,
        token: &str,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|r| r.token == token) {
            return Err(AuthError::DuplicateToken);
        }

        let row = IssuedToken {
            token: token.to_owned(),
            owner_id,
            purpose,
            expires_at,
            created_at: Utc::now(),
        };

        rows.push(row.clone());
        drop(rows);

        Ok(row)
    }

    async fn find_active(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<IssuedToken>, AuthError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.token == token && r.purpose == purpose && r.expires_at > Utc::now())
            .cloned())
    }

    async fn consume(&self, token: &str) -> Result<(), AuthError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.token != token);
        drop(rows);
        Ok(())
    }

    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        // Check-and-swap under one guard, mirroring the conditional UPDATE
        // the SQLite backend performs.
        let mut rows = self.rows.lock().unwrap();

        let row = rows
            .iter_mut()
            .find(|r| r.token == old_token && r.expires_at > Utc::now())
            .ok_or(AuthError::InvalidRefreshToken)?;

        row.token = new_token.to_owned();
        row.expires_at = new_expires_at;
        Ok(row.clone())
    }

    async fn revoke_for_owner(
        &self,
        owner_id: i32,
        purpose: TokenPurpose,
    ) -> Result<u64, AuthError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.owner_id == owner_id && r.purpose == purpose));
        Ok((before - rows.len()) as u64)
    }

    async fn prune_expired(&self) -> Result<u64, AuthError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        let now = Utc::now();
        rows.retain(|r| r.expires_at > now);
        Ok((before - rows.len()) as u64)
    }
}

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use super::account::{Account, AccountRepository, NewAccount};
use crate::AuthError;

/// In-memory account store for tests. Clones share the same storage.
#[derive(Clone)]
pub struct MockAccountRepository {
    pub accounts: Arc<Mutex<Vec<Account>>>,
    next_id: Arc<Mutex<i32>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(Mutex::new(1)),
        }
    }
}

impl Default for MockAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let email = email.to_lowercase();
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn create(&self, new: NewAccount) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        let email = new.email.to_lowercase();

        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::AccountExists);
        }

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let now = Utc::now();
        let account = Account {
            id,
            email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            roles: new.roles,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        accounts.push(account.clone());
        drop(accounts);

        Ok(account)
    }

    async fn update_password(
        &self,
        account_id: i32,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) {
            account.password_hash = password_hash.to_owned();
            account.updated_at = Utc::now();
            Ok(())
        } else {
            Err(AuthError::AccountNotFound)
        }
    }

    async fn mark_verified(&self, account_id: i32) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) {
            account.is_verified = true;
            account.updated_at = Utc::now();
            Ok(())
        } else {
            Err(AuthError::AccountNotFound)
        }
    }
}

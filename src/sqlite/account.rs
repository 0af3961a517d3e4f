use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::repository::{Account, AccountRepository, NewAccount, Role};
use crate::AuthError;

#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccountRecord {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    /// JSON array of role names.
    roles: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRecord> for Account {
    type Error = AuthError;

    fn try_from(row: AccountRecord) -> Result<Self, Self::Error> {
        let roles: Vec<Role> = serde_json::from_str(&row.roles)
            .map_err(|e| AuthError::DatabaseError(format!("bad roles column: {e}")))?;

        Ok(Account {
            id: row.id as i32,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            roles,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AuthError> {
        let row: Option<AccountRecord> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, password_hash, roles, is_verified, created_at, updated_at
             FROM accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(operation = "find_by_id", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.map(TryInto::try_into).transpose()
    }

    #[tracing::instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let row: Option<AccountRecord> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, password_hash, roles, is_verified, created_at, updated_at
             FROM accounts WHERE email = ?",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(operation = "find_by_email", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.map(TryInto::try_into).transpose()
    }

    #[tracing::instrument(skip(self, new), err)]
    async fn create(&self, new: NewAccount) -> Result<Account, AuthError> {
        let roles = serde_json::to_string(&new.roles)
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        let now = Utc::now();

        let row: AccountRecord = sqlx::query_as(
            "INSERT INTO accounts (email, first_name, last_name, password_hash, roles, is_verified, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)
             RETURNING id, email, first_name, last_name, password_hash, roles, is_verified, created_at, updated_at",
        )
        .bind(new.email.to_lowercase())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(&roles)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AuthError::AccountExists;
            }
            tracing::error!(operation = "create", error = %e, "database error");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    #[tracing::instrument(skip(self, password_hash), err)]
    async fn update_password(
        &self,
        account_id: i32,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(account_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(operation = "update_password", error = %e, "database error");
                    AuthError::DatabaseError(e.to_string())
                })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn mark_verified(&self, account_id: i32) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE accounts SET is_verified = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(operation = "mark_verified", error = %e, "database error");
                AuthError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Role tags carried by an account. An account always has at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    SuperAdmin,
}

impl Role {
    /// The wire name of the role, identical to its serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account as seen by the session core.
///
/// `password_hash` is loaded so login can verify credentials; the API layer
/// strips it before anything is serialized back to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// New-account fields passed to [`AccountRepository::create`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

#[async_trait]
pub trait AccountRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AuthError>;

    /// Lookup by email, including the password hash. Emails are compared
    /// case-insensitively; implementations store them lowercased.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Creates an unverified account. Fails `AccountExists` on a duplicate
    /// email.
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError>;

    async fn update_password(&self, account_id: i32, password_hash: &str)
        -> Result<(), AuthError>;

    async fn mark_verified(&self, account_id: i32) -> Result<(), AuthError>;
}

#[cfg(any(test, feature = "mocks"))]
impl Account {
    pub fn mock(id: i32, email: &str) -> Self {
        let now = Utc::now();
        Account {
            id,
            email: email.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "Account".to_owned(),
            password_hash: "fakehashedpassword".to_owned(),
            roles: vec![Role::Student],
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

//! Role-based access control for protected routes.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;
use super::middleware::CurrentAccount;
use crate::repository::{Account, Role};
use crate::AuthError;

/// The role a [`RoleGuard`] demands. Implemented by zero-sized markers so
/// the requirement is part of the handler signature.
pub trait RoleRequirement: Send + Sync {
    fn required() -> Role;
}

#[derive(Debug, Clone, Copy)]
pub struct StudentOnly;

impl RoleRequirement for StudentOnly {
    fn required() -> Role {
        Role::Student
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstructorOnly;

impl RoleRequirement for InstructorOnly {
    fn required() -> Role {
        Role::Instructor
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuperAdminOnly;

impl RoleRequirement for SuperAdminOnly {
    fn required() -> Role {
        Role::SuperAdmin
    }
}

/// Returns `Forbidden` unless the account holds the role. Super admins pass
/// every gate.
pub fn check_role(account: &Account, required: Role) -> Result<(), AuthError> {
    if account.has_role(required) || account.has_role(Role::SuperAdmin) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Extractor that rejects requests whose authenticated account lacks a role.
///
/// Must run behind [`super::authenticate`]: a request with no
/// [`CurrentAccount`] extension is `Unauthorized`, one with the wrong role
/// is `Forbidden`.
pub struct RoleGuard<R: RoleRequirement> {
    account: Account,
    _marker: PhantomData<R>,
}

impl<R: RoleRequirement> RoleGuard<R> {
    pub fn into_inner(self) -> Account {
        self.account
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

impl<S, R> FromRequestParts<S> for RoleGuard<R>
where
    S: Send + Sync,
    R: RoleRequirement,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<CurrentAccount>()
            .cloned()
            .ok_or(ApiError(AuthError::Unauthorized))?;

        check_role(current.account(), R::required())?;

        Ok(RoleGuard {
            account: current.into_inner(),
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_role_requires_membership() {
        let account = Account::mock(1, "s@x.com");
        assert_eq!(
            check_role(&account, Role::Instructor).unwrap_err(),
            AuthError::Forbidden
        );
        assert!(check_role(&account, Role::Student).is_ok());
    }

    #[test]
    fn test_super_admin_passes_every_gate() {
        let mut account = Account::mock(1, "root@x.com");
        account.roles = vec![Role::SuperAdmin];
        assert!(check_role(&account, Role::Instructor).is_ok());
        assert!(check_role(&account, Role::Student).is_ok());
    }
}

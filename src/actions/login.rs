use chrono::Utc;

use crate::crypto::{verify_password, SecretString};
use crate::repository::{Account, AccountRepository, Role, TokenLedger, TokenPurpose};
use crate::token::{TokenPair, TokenSigner};
use crate::AuthError;

pub struct LoginAction<A: AccountRepository, L: TokenLedger> {
    accounts: A,
    ledger: L,
    signer: TokenSigner,
}

impl<A: AccountRepository, L: TokenLedger> LoginAction<A, L> {
    pub fn new(accounts: A, ledger: L, signer: TokenSigner) -> Self {
        LoginAction {
            accounts,
            ledger,
            signer,
        }
    }

    /// Verifies credentials and issues an access+refresh pair, recording
    /// the refresh token in the ledger.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`.
    /// Unverified accounts are rejected with `NotVerified` unless they hold
    /// the superadmin role.
    #[tracing::instrument(name = "login", skip_all, err)]
    pub async fn execute(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(Account, TokenPair), AuthError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_verified && !account.has_role(Role::SuperAdmin) {
            return Err(AuthError::NotVerified);
        }

        let pair = self.signer.create_pair(&account)?;
        let expires_at = Utc::now() + self.signer.refresh_ttl();
        self.ledger
            .create(account.id, &pair.refresh_token, TokenPurpose::Refresh, expires_at)
            .await?;

        Ok((account, pair))
    }
}

use chrono::Utc;

use crate::repository::{Account, AccountRepository, TokenLedger, TokenPurpose};
use crate::token::{TokenPair, TokenSigner};
use crate::AuthError;

pub struct RefreshAction<A: AccountRepository, L: TokenLedger> {
    accounts: A,
    ledger: L,
    signer: TokenSigner,
}

impl<A: AccountRepository, L: TokenLedger> RefreshAction<A, L> {
    pub fn new(accounts: A, ledger: L, signer: TokenSigner) -> Self {
        RefreshAction {
            accounts,
            ledger,
            signer,
        }
    }

    /// Exchanges a live refresh token for a new access+refresh pair,
    /// rotating the ledger row in place.
    ///
    /// The rotation is a single conditional store operation, so of two
    /// concurrent calls presenting the same token exactly one succeeds;
    /// the other gets `InvalidRefreshToken`, as does any later replay of
    /// the old value.
    #[tracing::instrument(name = "refresh", skip_all, err)]
    pub async fn execute(&self, refresh_token: &str) -> Result<(Account, TokenPair), AuthError> {
        let row = self
            .ledger
            .find_active(refresh_token, TokenPurpose::Refresh)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let claims = self
            .signer
            .verify_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.account_id()? != row.owner_id {
            return Err(AuthError::InvalidRefreshToken);
        }

        let account = self
            .accounts
            .find_by_id(row.owner_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let pair = self.signer.create_pair(&account)?;
        let new_expires_at = Utc::now() + self.signer.refresh_ttl();
        self.ledger
            .rotate(refresh_token, &pair.refresh_token, new_expires_at)
            .await?;

        Ok((account, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{LoginAction, LogoutAction};
    use crate::config::SignerConfig;
    use crate::crypto::{hash_password, SecretString};
    use crate::repository::Role;
    use crate::{MockAccountRepository, MockTokenLedger};

    fn signer() -> TokenSigner {
        TokenSigner::new(SignerConfig::new("test-secret-32-bytes-long-key-01").unwrap())
    }

    async fn logged_in_setup() -> (MockAccountRepository, MockTokenLedger, TokenPair) {
        let accounts = MockAccountRepository::new();
        let ledger = MockTokenLedger::new();

        let mut account = Account::mock(1, "a@x.com");
        account.password_hash = hash_password(&SecretString::new("Abcdef1!")).unwrap();
        account.is_verified = true;
        account.roles = vec![Role::Student];
        accounts.accounts.lock().unwrap().push(account);

        let login = LoginAction::new(accounts.clone(), ledger.clone(), signer());
        let (_, pair) = login
            .execute("a@x.com", &SecretString::new("Abcdef1!"))
            .await
            .unwrap();

        (accounts, ledger, pair)
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_dies() {
        let (accounts, ledger, pair) = logged_in_setup().await;
        let action = RefreshAction::new(accounts, ledger, signer());

        let (account, new_pair) = action.execute(&pair.refresh_token).await.unwrap();
        assert_eq!(account.id, 1);
        assert_ne!(new_pair.refresh_token, pair.refresh_token);

        // Presenting the consumed token again fails
        let err = action.execute(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidRefreshToken);

        // The rotated token works
        assert!(action.execute(&new_pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_after_logout_fails() {
        let (accounts, ledger, pair) = logged_in_setup().await;

        let logout = LogoutAction::new(ledger.clone());
        logout.execute(&pair.refresh_token).await.unwrap();

        let action = RefreshAction::new(accounts, ledger, signer());
        let err = action.execute(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidRefreshToken);
        assert_eq!(err.to_string(), "Invalid or expired refresh token");
    }

    #[tokio::test]
    async fn test_refresh_unknown_token_fails() {
        let (accounts, ledger, _) = logged_in_setup().await;
        let action = RefreshAction::new(accounts, ledger, signer());

        let err = action.execute("never-issued").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidRefreshToken);
    }

    #[tokio::test]
    async fn test_refresh_fails_when_account_deleted() {
        let (accounts, ledger, pair) = logged_in_setup().await;
        accounts.accounts.lock().unwrap().clear();

        let action = RefreshAction::new(accounts, ledger, signer());
        let err = action.execute(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err, AuthError::AccountNotFound);
    }

    #[tokio::test]
    async fn test_refresh_rejects_ledger_row_with_foreign_signature() {
        // A row whose value is not a refresh JWT under our secret must not
        // pass even though the ledger says it is live.
        let (accounts, ledger, _) = logged_in_setup().await;
        ledger
            .create(1, "forged-value", TokenPurpose::Refresh, Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        let action = RefreshAction::new(accounts, ledger, signer());
        let err = action.execute("forged-value").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidRefreshToken);
    }
}

use crate::crypto::{hash_password, SecretString};
use crate::repository::{AccountRepository, TokenLedger, TokenPurpose};
use crate::token::{TokenKind, TokenSigner};
use crate::validators::validate_password;
use crate::AuthError;

pub struct ResetPasswordAction<A: AccountRepository, L: TokenLedger> {
    accounts: A,
    ledger: L,
    signer: TokenSigner,
}

impl<A: AccountRepository, L: TokenLedger> ResetPasswordAction<A, L> {
    pub fn new(accounts: A, ledger: L, signer: TokenSigner) -> Self {
        ResetPasswordAction {
            accounts,
            ledger,
            signer,
        }
    }

    /// Sets a new password for the token's owner and consumes the token.
    ///
    /// The token must verify as a reset token, still be present in the
    /// ledger, and name the same owner the ledger recorded. A token is only
    /// consumed once the new password is actually stored, so a rejected
    /// password leaves the link usable.
    #[tracing::instrument(name = "reset_password", skip_all, err)]
    pub async fn execute(&self, token: &str, password: &SecretString) -> Result<(), AuthError> {
        let claims = self.signer.verify_purpose(token, TokenKind::PasswordReset)?;

        let row = self
            .ledger
            .find_active(token, TokenPurpose::Reset)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let owner_id = claims.account_id()?;
        if owner_id != row.owner_id {
            return Err(AuthError::TokenInvalid);
        }

        validate_password(password.expose_secret())?;

        let account = self
            .accounts
            .find_by_id(owner_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let password_hash = hash_password(password)?;
        self.accounts
            .update_password(account.id, &password_hash)
            .await?;

        self.ledger.consume(token).await?;

        tracing::info!(account_id = account.id, "password reset completed");
        Ok(())
    }
}

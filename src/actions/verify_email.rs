use crate::repository::{AccountRepository, TokenLedger, TokenPurpose};
use crate::token::{TokenKind, TokenSigner};
use crate::AuthError;

pub struct VerifyEmailAction<A: AccountRepository, L: TokenLedger> {
    accounts: A,
    ledger: L,
    signer: TokenSigner,
}

impl<A: AccountRepository, L: TokenLedger> VerifyEmailAction<A, L> {
    pub fn new(accounts: A, ledger: L, signer: TokenSigner) -> Self {
        VerifyEmailAction {
            accounts,
            ledger,
            signer,
        }
    }

    /// Marks the account behind a verification link as verified and
    /// consumes the token.
    ///
    /// A token that decodes but is absent from the ledger was already used
    /// (or never issued) and is rejected. Verifying an already-verified
    /// account consumes the token and fails `AlreadyVerified`.
    #[tracing::instrument(name = "verify_email", skip_all, err)]
    pub async fn execute(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.signer.verify_purpose(token, TokenKind::Verification)?;

        let row = self
            .ledger
            .find_active(token, TokenPurpose::Verification)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if claims.account_id()? != row.owner_id {
            return Err(AuthError::TokenInvalid);
        }

        let account = self
            .accounts
            .find_by_id(row.owner_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.is_verified {
            self.ledger.consume(token).await?;
            return Err(AuthError::AlreadyVerified);
        }

        self.accounts.mark_verified(account.id).await?;
        self.ledger.consume(token).await?;

        Ok(())
    }
}

use chrono::Utc;

use crate::config::SessionConfig;
use crate::repository::{AccountRepository, TokenLedger, TokenPurpose};
use crate::token::{TokenKind, TokenSigner};
use crate::{AuthError, Mailer};

pub struct ResendVerificationAction<A: AccountRepository, L: TokenLedger, M: Mailer> {
    accounts: A,
    ledger: L,
    mailer: M,
    signer: TokenSigner,
    config: SessionConfig,
}

impl<A: AccountRepository, L: TokenLedger, M: Mailer> ResendVerificationAction<A, L, M> {
    pub fn new(accounts: A, ledger: L, mailer: M, signer: TokenSigner, config: SessionConfig) -> Self {
        ResendVerificationAction {
            accounts,
            ledger,
            mailer,
            signer,
            config,
        }
    }

    /// Mints a fresh verification link for an unverified account.
    ///
    /// Recovery path for a lost or expired first email, and for a send
    /// failure during registration. Silently no-ops for unknown or
    /// already-verified emails so the endpoint does not leak which addresses
    /// have accounts. The previous verification token is revoked, so only
    /// the newest link works.
    #[tracing::instrument(name = "resend_verification", skip_all, err)]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let account = match self.accounts.find_by_email(email).await? {
            Some(account) if !account.is_verified => account,
            _ => {
                tracing::debug!("verification resend skipped");
                return Ok(());
            }
        };

        let token = self
            .signer
            .sign_purpose(account.id, TokenKind::Verification)?;

        self.ledger
            .revoke_for_owner(account.id, TokenPurpose::Verification)
            .await?;
        let expires_at = Utc::now() + self.signer.verification_ttl();
        self.ledger
            .create(account.id, &token, TokenPurpose::Verification, expires_at)
            .await?;

        if let Err(err) = self
            .mailer
            .send_verification_link(&account.email, &self.config.verification_link(&token))
            .await
        {
            tracing::warn!(account_id = account.id, error = %err, "verification email failed");
        }

        Ok(())
    }
}

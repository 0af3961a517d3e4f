use chrono::Utc;

use crate::config::SessionConfig;
use crate::repository::{AccountRepository, TokenLedger, TokenPurpose};
use crate::token::{TokenKind, TokenSigner};
use crate::{AuthError, Mailer};

pub struct ForgotPasswordAction<A: AccountRepository, L: TokenLedger, M: Mailer> {
    accounts: A,
    ledger: L,
    mailer: M,
    signer: TokenSigner,
    config: SessionConfig,
}

impl<A: AccountRepository, L: TokenLedger, M: Mailer> ForgotPasswordAction<A, L, M> {
    pub fn new(accounts: A, ledger: L, mailer: M, signer: TokenSigner, config: SessionConfig) -> Self {
        ForgotPasswordAction {
            accounts,
            ledger,
            mailer,
            signer,
            config,
        }
    }

    /// Issues a reset token and emails the link.
    ///
    /// Silently no-ops for unknown emails so the endpoint cannot be used to
    /// enumerate accounts. Issuing replaces any prior reset token for the
    /// owner, so only the latest link stays usable.
    #[tracing::instrument(name = "forgot_password", skip_all, err)]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        let account = match self.accounts.find_by_email(email).await? {
            Some(account) => account,
            None => {
                tracing::debug!("password reset requested for unknown email");
                return Ok(());
            }
        };

        let token = self
            .signer
            .sign_purpose(account.id, TokenKind::PasswordReset)?;

        self.ledger
            .revoke_for_owner(account.id, TokenPurpose::Reset)
            .await?;
        let expires_at = Utc::now() + self.signer.reset_ttl();
        self.ledger
            .create(account.id, &token, TokenPurpose::Reset, expires_at)
            .await?;

        self.mailer
            .send_reset_link(&account.email, &self.config.reset_link(&token))
            .await
    }
}

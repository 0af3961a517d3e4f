use chrono::Utc;

use crate::config::SessionConfig;
use crate::crypto::{hash_password, SecretString};
use crate::repository::{Account, AccountRepository, NewAccount, Role, TokenLedger, TokenPurpose};
use crate::token::{TokenKind, TokenSigner};
use crate::validators::{validate_email, validate_name, validate_password};
use crate::{AuthError, Mailer};

pub struct RegisterAction<A: AccountRepository, L: TokenLedger, M: Mailer> {
    accounts: A,
    ledger: L,
    mailer: M,
    signer: TokenSigner,
    config: SessionConfig,
}

impl<A: AccountRepository, L: TokenLedger, M: Mailer> RegisterAction<A, L, M> {
    pub fn new(accounts: A, ledger: L, mailer: M, signer: TokenSigner, config: SessionConfig) -> Self {
        RegisterAction {
            accounts,
            ledger,
            mailer,
            signer,
            config,
        }
    }

    /// Creates an unverified account and emails a verification link.
    ///
    /// The mail send is fire-and-forget: a mailer failure is logged and the
    /// account is kept, leaving resend-verification as the recovery path.
    #[tracing::instrument(name = "register", skip_all, err)]
    pub async fn execute(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &SecretString,
    ) -> Result<Account, AuthError> {
        validate_email(email)?;
        validate_name(first_name)?;
        validate_name(last_name)?;
        validate_password(password.expose_secret())?;

        if self.accounts.find_by_email(email).await?.is_some() {
            return Err(AuthError::AccountExists);
        }

        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create(NewAccount {
                email: email.to_owned(),
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                password_hash,
                roles: vec![Role::Student],
            })
            .await?;

        let token = self.signer.sign_purpose(account.id, TokenKind::Verification)?;
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
            tracing::warn!(
                account_id = account.id,
                error = %err,
                "verification email failed to send; account kept"
            );
        }

        Ok(account)
    }
}

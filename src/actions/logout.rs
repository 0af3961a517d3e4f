use crate::repository::TokenLedger;
use crate::AuthError;

pub struct LogoutAction<L: TokenLedger> {
    ledger: L,
}

impl<L: TokenLedger> LogoutAction<L> {
    pub fn new(ledger: L) -> Self {
        LogoutAction { ledger }
    }

    /// Consumes the refresh token unconditionally. Idempotent: logging out
    /// an already-consumed token still succeeds.
    #[tracing::instrument(name = "logout", skip_all, err)]
    pub async fn execute(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.ledger.consume(refresh_token).await
    }
}

use crate::repository::TokenLedger;
use crate::AuthError;

/// Deletes ledger rows whose expiry has passed.
///
/// Expired rows are already invisible to lookups; this is housekeeping
/// meant for a periodic task so the ledger does not grow without bound.
pub struct PruneExpiredAction<L: TokenLedger> {
    ledger: L,
}

impl<L: TokenLedger> PruneExpiredAction<L> {
    pub fn new(ledger: L) -> Self {
        PruneExpiredAction { ledger }
    }

    /// Returns the number of rows removed.
    #[tracing::instrument(name = "prune_expired", skip_all, err)]
    pub async fn execute(&self) -> Result<u64, AuthError> {
        let pruned = self.ledger.prune_expired().await?;
        if pruned > 0 {
            tracing::info!(pruned, "removed expired ledger rows");
        }
        Ok(pruned)
    }
}

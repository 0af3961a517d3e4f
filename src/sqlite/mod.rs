//! `SQLite` storage backend.
//!
//! Enable the `sqlx_sqlite` feature to use these implementations. Tokens are
//! stored hashed, so a leaked database dump does not yield usable tokens.

mod account;
mod ledger;
pub mod migrations;

pub use account::SqliteAccountRepository;
pub use ledger::SqliteTokenLedger;

use sqlx::SqlitePool;

/// Creates both `SQLite` repositories from one connection pool.
pub fn create_repositories(pool: SqlitePool) -> (SqliteAccountRepository, SqliteTokenLedger) {
    (
        SqliteAccountRepository::new(pool.clone()),
        SqliteTokenLedger::new(pool),
    )
}

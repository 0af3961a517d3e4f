//! Storage abstractions for accounts and the token ledger.
//!
//! Implement [`AccountRepository`] and [`TokenLedger`] to use your own
//! database. The `sqlx_sqlite` feature provides SQLite-backed
//! implementations; the `mocks` feature provides in-memory ones for testing.

mod account;
mod ledger;

#[cfg(any(test, feature = "mocks"))]
mod account_mock;
#[cfg(any(test, feature = "mocks"))]
mod ledger_mock;

pub use account::Account;
pub use account::AccountRepository;
pub use account::NewAccount;
pub use account::Role;
pub use ledger::IssuedToken;
pub use ledger::TokenLedger;
pub use ledger::TokenPurpose;

#[cfg(any(test, feature = "mocks"))]
pub use account_mock::MockAccountRepository;
#[cfg(any(test, feature = "mocks"))]
pub use ledger_mock::MockTokenLedger;

//! Stateless signing and verification of session tokens.
//!
//! The signer is purely a function of (claims, secret, ttl); which tokens
//! are still *live* is tracked by the [`TokenLedger`](crate::TokenLedger),
//! not here. Callers must check the ledger for refresh, verification and
//! reset tokens, and must not for short-lived access tokens, which trade
//! instant revocation for statelessness.
//!
//! # Example
//!
//! ```ignore
//! use sessiongate::{SignerConfig, TokenSigner};
//!
//! let config = SignerConfig::new("a-signing-secret-at-least-32-bytes")?;
//! let signer = TokenSigner::new(config);
//!
//! let pair = signer.create_pair(&account)?;
//! let claims = signer.verify_access(&pair.access_token)?;
//! ```

mod claims;
mod signer;

pub use claims::{Claims, TokenKind};
pub use signer::{TokenPair, TokenSigner};

//! Password hashing and secret handling.

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::AuthError;

/// A wrapper for sensitive string data that prevents accidental logging.
///
/// `Debug` and `Display` print `[REDACTED]` instead of the content.
/// Serialization exposes the real value so tokens can still be returned in
/// API responses.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the secret value. Use only at the point it is actually
    /// needed, such as when passing it to a hashing function.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}

/// Pluggable password hashing. The default implementation is [`Argon2Hasher`].
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a PHC string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a PHC string.
    ///
    /// Returns `AuthError::PasswordHashError` if the hash is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id password hasher with configurable parameters.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    /// Number of iterations
    time_cost: u32,
    /// Degree of parallelism
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB - argon2 default
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// OWASP-recommended production settings: 64 MiB memory, 3 iterations,
    /// 4 threads.
    #[must_use]
    pub fn production() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        // Verification uses params from the hash, not from config
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Hashes a password with the default Argon2id parameters.
pub fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    Argon2Hasher::default().hash(password.expose_secret())
}

/// Verifies a password against a stored PHC string.
pub fn verify_password(password: &SecretString, hash: &str) -> Result<bool, AuthError> {
    Argon2Hasher::default().verify(password.expose_secret(), hash)
}

/// Generates a cryptographically random alphanumeric string.
#[must_use]
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// SHA-256 of a token value, hex encoded.
///
/// Persisted backends store this instead of the raw token so a leaked
/// ledger cannot be replayed directly.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

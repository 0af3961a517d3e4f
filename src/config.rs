//! Configuration for the session core.
//!
//! # Example
//!
//! ```rust
//! use sessiongate::config::{SessionConfig, SignerConfig};
//! use chrono::Duration;
//!
//! let signer = SignerConfig::new("a-signing-secret-at-least-32-bytes")
//!     .unwrap()
//!     .with_access_ttl(Duration::minutes(15))
//!     .with_refresh_ttl(Duration::days(7));
//!
//! let config = SessionConfig::new(signer, "https://app.example.com")
//!     .with_renew_threshold(Duration::minutes(5));
//! ```

use chrono::Duration;
use std::fmt;

use crate::crypto::SecretString;
use crate::AuthError;

/// Minimum required length for a signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Configuration for token signing and expiry.
#[derive(Clone)]
pub struct SignerConfig {
    /// Secret used to sign access and purpose tokens (HS256).
    pub(crate) secret: SecretString,
    /// Separate secret for refresh tokens. Falls back to `secret` when unset.
    pub(crate) refresh_secret: Option<SecretString>,
    /// Access token ttl. Default: 15 minutes.
    pub(crate) access_ttl: Duration,
    /// Refresh token ttl. Default: 7 days.
    pub(crate) refresh_ttl: Duration,
    /// Email verification token ttl. Default: 24 hours.
    pub(crate) verification_ttl: Duration,
    /// Password reset token ttl. Default: 24 hours.
    pub(crate) reset_ttl: Duration,
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("secret", &"[REDACTED]")
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "[REDACTED]"))
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

impl SignerConfig {
    /// Creates a signer configuration with the given secret.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            secret: SecretString::new(secret),
            refresh_secret: None,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            verification_ttl: Duration::hours(24),
            reset_ttl: Duration::hours(24),
        })
    }

    /// Sets a separate secret for refresh tokens.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` if the secret is too short.
    pub fn with_refresh_secret(mut self, secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "refresh secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        self.refresh_secret = Some(SecretString::new(secret));
        Ok(self)
    }

    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn verification_ttl(&self) -> Duration {
        self.verification_ttl
    }

    pub fn reset_ttl(&self) -> Duration {
        self.reset_ttl
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Signing and expiry settings.
    pub signer: SignerConfig,
    /// Remaining access-token lifetime below which the middleware silently
    /// mints a replacement and returns it in the `new-token` response header.
    ///
    /// Default: 5 minutes (a third of the default access ttl).
    pub renew_threshold: Duration,
    /// Base URL used to build verification and reset links in emails.
    pub frontend_base_url: String,
}

impl SessionConfig {
    pub fn new(signer: SignerConfig, frontend_base_url: impl Into<String>) -> Self {
        Self {
            signer,
            renew_threshold: Duration::minutes(5),
            frontend_base_url: trim_trailing_slash(frontend_base_url.into()),
        }
    }

    #[must_use]
    pub fn with_renew_threshold(mut self, threshold: Duration) -> Self {
        self.renew_threshold = threshold;
        self
    }

    /// Loads configuration from the environment.
    ///
    /// Reads `SESSIONGATE_SECRET` (required), `SESSIONGATE_REFRESH_SECRET`
    /// (optional, falls back to the primary secret) and
    /// `SESSIONGATE_FRONTEND_URL` (required).
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = std::env::var("SESSIONGATE_SECRET").map_err(|_| {
            AuthError::ConfigurationError("SESSIONGATE_SECRET is not set".to_owned())
        })?;
        let frontend_base_url = std::env::var("SESSIONGATE_FRONTEND_URL").map_err(|_| {
            AuthError::ConfigurationError("SESSIONGATE_FRONTEND_URL is not set".to_owned())
        })?;

        let mut signer = SignerConfig::new(secret)?;
        if let Ok(refresh_secret) = std::env::var("SESSIONGATE_REFRESH_SECRET") {
            signer = signer.with_refresh_secret(refresh_secret)?;
        }

        Ok(Self::new(signer, frontend_base_url))
    }

    /// Link embedded in verification emails.
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email/{token}", self.frontend_base_url)
    }

    /// Link embedded in password reset emails.
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password/{token}", self.frontend_base_url)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

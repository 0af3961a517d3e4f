use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use super::{Claims, TokenKind};
use crate::config::SignerConfig;
use crate::crypto::generate_token;
use crate::repository::Account;
use crate::AuthError;

/// Length of the random `jti` claim.
const JTI_LENGTH: usize = 16;

/// An access/refresh token pair as returned by login and refresh.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Produces and validates signed, time-bounded tokens (HS256).
///
/// Every issuance site in the crate (login, explicit refresh, and the
/// middleware's silent renewal) goes through these methods, so the two
/// renewal paths cannot diverge in claim shape or ttl.
#[derive(Clone)]
pub struct TokenSigner {
    config: SignerConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
}

impl TokenSigner {
    pub fn new(config: SignerConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        // Refresh tokens fall back to the primary secret when no separate
        // one is configured.
        let refresh_secret = config
            .refresh_secret
            .as_ref()
            .unwrap_or(&config.secret)
            .expose_secret()
            .as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret),
            config,
        }
    }

    /// Signs a short-lived access token carrying email and roles.
    pub fn sign_access(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            email: Some(account.email.clone()),
            roles: Some(account.roles.clone()),
            iat: now.timestamp(),
            exp: (now + self.config.access_ttl()).timestamp(),
            jti: generate_token(JTI_LENGTH),
            kind: TokenKind::Access,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Signs a long-lived refresh token carrying only the subject.
    pub fn sign_refresh(&self, account_id: i32) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            email: None,
            roles: None,
            iat: now.timestamp(),
            exp: (now + self.config.refresh_ttl()).timestamp(),
            jti: generate_token(JTI_LENGTH),
            kind: TokenKind::Refresh,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Signs a one-time verification or password-reset token.
    ///
    /// # Errors
    /// `AuthError::WrongPurpose` when called with `Access` or `Refresh`.
    pub fn sign_purpose(&self, account_id: i32, kind: TokenKind) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Verification => self.config.verification_ttl(),
            TokenKind::PasswordReset => self.config.reset_ttl(),
            TokenKind::Access | TokenKind::Refresh => return Err(AuthError::WrongPurpose),
        };

        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            email: None,
            roles: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: generate_token(JTI_LENGTH),
            kind,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Mints a fresh access+refresh pair for an account.
    pub fn create_pair(&self, account: &Account) -> Result<TokenPair, AuthError> {
        let access_token = self.sign_access(account)?;
        let refresh_token = self.sign_refresh(account.id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_ttl().num_seconds(),
        })
    }

    /// Verifies an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token, &self.decoding_key)?;

        if !claims.is_access() {
            return Err(AuthError::WrongPurpose);
        }

        Ok(claims)
    }

    /// Verifies a refresh token against the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token, &self.refresh_decoding_key)?;

        if !claims.is_refresh() {
            return Err(AuthError::WrongPurpose);
        }

        Ok(claims)
    }

    /// Verifies a purpose token and checks its `typ` claim matches the
    /// expected purpose, failing `WrongPurpose` otherwise.
    pub fn verify_purpose(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.decode(token, &self.decoding_key)?;

        if claims.kind != expected {
            return Err(AuthError::WrongPurpose);
        }

        Ok(claims)
    }

    pub fn access_ttl(&self) -> Duration {
        self.config.access_ttl()
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.config.refresh_ttl()
    }

    pub fn verification_ttl(&self) -> Duration {
        self.config.verification_ttl()
    }

    pub fn reset_ttl(&self) -> Duration {
        self.config.reset_ttl()
    }

    fn decode(&self, token: &str, key: &DecodingKey) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60s leeway would let expired tokens
        // linger past their claimed exp.
        validation.leeway = 0;

        let data =
            jsonwebtoken::decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })?;

        Ok(data.claims)
    }
}

//! Outbound email seam.
//!
//! Delivery itself is an external collaborator; the session core only needs
//! a trait to hand links to. Registration treats a send failure as
//! non-fatal (logged, account kept), so implementations should not retry
//! internally.

use async_trait::async_trait;

use crate::AuthError;

#[async_trait]
pub trait Mailer {
    /// Sends an email verification link.
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), AuthError>;

    /// Sends a password reset link.
    async fn send_reset_link(&self, email: &str, link: &str) -> Result<(), AuthError>;
}

/// A captured outbound message.
#[cfg(any(test, feature = "mocks"))]
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    pub to: String,
    pub link: String,
    pub kind: MailKind,
}

#[cfg(any(test, feature = "mocks"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Verification,
    PasswordReset,
}

/// Records sent mail instead of delivering it. Clones share the same
/// outbox. Use `failing` to exercise the fire-and-forget paths.
#[cfg(any(test, feature = "mocks"))]
#[derive(Clone)]
pub struct MockMailer {
    pub sent: std::sync::Arc<std::sync::Mutex<Vec<OutboundMail>>>,
    failing: bool,
}

#[cfg(any(test, feature = "mocks"))]
impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Arc::new(std::sync::Mutex::new(vec![])),
            failing: false,
        }
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: std::sync::Arc::new(std::sync::Mutex::new(vec![])),
            failing: true,
        }
    }

    fn record(&self, to: &str, link: &str, kind: MailKind) -> Result<(), AuthError> {
        if self.failing {
            return Err(AuthError::MailerError("smtp unreachable".to_owned()));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(OutboundMail {
            to: to.to_owned(),
            link: link.to_owned(),
            kind,
        });
        Ok(())
    }
}

#[cfg(any(test, feature = "mocks"))]
impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mocks"))]
#[async_trait]
impl Mailer for MockMailer {
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), AuthError> {
        self.record(email, link, MailKind::Verification)
    }

    async fn send_reset_link(&self, email: &str, link: &str) -> Result<(), AuthError> {
        self.record(email, link, MailKind::PasswordReset)
    }
}

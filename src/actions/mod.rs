//! The credential-action flows, one action per flow.
//!
//! Each action is a short, independent state machine over the repositories
//! it needs; dependencies are passed in at construction rather than held in
//! process-global state.

pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod prune_expired;
pub mod refresh;
pub mod register;
pub mod resend_verification;
pub mod reset_password;
pub mod verify_email;

pub use forgot_password::ForgotPasswordAction;
pub use login::LoginAction;
pub use logout::LogoutAction;
pub use prune_expired::PruneExpiredAction;
pub use refresh::RefreshAction;
pub use register::RegisterAction;
pub use resend_verification::ResendVerificationAction;
pub use reset_password::ResetPasswordAction;
pub use verify_email::VerifyEmailAction;

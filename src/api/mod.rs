//! Axum surface over the credential actions.

mod error;
mod handlers;
mod middleware;
mod role;
mod routes;
mod types;

pub use error::{ApiError, ErrorBody};
pub use middleware::{authenticate, extract_bearer_token, CurrentAccount, NEW_TOKEN_HEADER};
pub use role::{check_role, InstructorOnly, RoleGuard, RoleRequirement, StudentOnly, SuperAdminOnly};
pub use routes::{router, ApiState};
pub use types::{
    AccountResponse, ApiResponse, AuthData, ForgotPasswordRequest, LoginRequest, LogoutRequest,
    RefreshTokenRequest, RegisterRequest, ResendVerificationRequest, ResetPasswordRequest,
};

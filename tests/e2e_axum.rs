//! End-to-end tests for the HTTP layer over the in-memory mocks.
//!
//! Run with: `cargo test --test e2e_axum`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use sessiongate::api::{
    authenticate, router, ApiState, InstructorOnly, RoleGuard, NEW_TOKEN_HEADER,
};
use sessiongate::config::{SessionConfig, SignerConfig};
use sessiongate::crypto::hash_password;
use sessiongate::mailer::MailKind;
use sessiongate::token::TokenSigner;
use sessiongate::{
    Account, AccountRepository, MockAccountRepository, MockMailer, MockTokenLedger, Role,
    SecretString,
};
use tower::ServiceExt;

type TestState = ApiState<MockAccountRepository, MockTokenLedger, MockMailer>;

fn test_config() -> SessionConfig {
    let signer = SignerConfig::new("e2e-test-secret-32-bytes-long-key").unwrap();
    SessionConfig::new(signer, "https://app.example.com")
}

fn create_state(config: SessionConfig) -> TestState {
    ApiState {
        accounts: MockAccountRepository::new(),
        ledger: MockTokenLedger::new(),
        mailer: MockMailer::new(),
        signer: TokenSigner::new(config.signer.clone()),
        config,
    }
}

fn create_app(state: TestState) -> Router {
    router(state)
}

async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str) {
    let response = send(
        app,
        post_json(
            "/auth/register",
            serde_json::json!({
                "email": email,
                "password": "Abcdef1!",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Pulls the token out of the last link mailed to `email`.
fn mailed_token(state: &TestState, email: &str, kind: MailKind) -> String {
    let sent = state.mailer.sent.lock().unwrap();
    let mail = sent
        .iter()
        .rev()
        .find(|m| m.to == email && m.kind == kind)
        .expect("no matching mail captured");
    mail.link.rsplit('/').next().unwrap().to_owned()
}

async fn register_and_verify(app: &Router, state: &TestState, email: &str) {
    register(app, email).await;
    let token = mailed_token(state, email, MailKind::Verification);
    let response = send(app, get_request(&format!("/auth/verify-email/{token}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    let response = send(
        app,
        post_json(
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        ),
    )
    .await;
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// Registration

#[tokio::test]
async fn test_register_returns_envelope_and_mails_verification_link() {
    let state = create_state(test_config());
    let app = create_app(state.clone());

    let response = send(
        &app,
        post_json(
            "/auth/register",
            serde_json::json!({
                "email": "ada@example.com",
                "password": "Abcdef1!",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["firstName"], "Ada");
    assert_eq!(body["data"]["isVerified"], false);
    assert_eq!(body["data"]["roles"][0], "student");
    assert!(body["data"].get("passwordHash").is_none());

    let sent = state.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].link.starts_with("https://app.example.com/verify-email/"));

    let rows = state.ledger.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = create_app(create_state(test_config()));
    register(&app, "dup@example.com").await;

    let response = send(
        &app,
        post_json(
            "/auth/register",
            serde_json::json!({
                "email": "dup@example.com",
                "password": "Abcdef1!",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "ACCOUNT_EXISTS");
}

#[tokio::test]
async fn test_register_invalid_email_is_bad_request() {
    let app = create_app(create_state(test_config()));

    let response = send(
        &app,
        post_json(
            "/auth/register",
            serde_json::json!({
                "email": "notanemail",
                "password": "Abcdef1!",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// Email verification and login

#[tokio::test]
async fn test_login_rejected_until_verified() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register(&app, "ada@example.com").await;

    let (status, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please verify your email before logging in");
    assert_eq!(body["code"], "NOT_VERIFIED");

    register_and_verify(&app, &state, "grace@example.com").await;
    let (status, body) = login(&app, "grace@example.com", "Abcdef1!").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tokens"]["accessToken"].is_string());
    assert!(body["data"]["tokens"]["refreshToken"].is_string());
}

#[tokio::test]
async fn test_verification_link_is_single_use() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register(&app, "ada@example.com").await;

    let token = mailed_token(&state, "ada@example.com", MailKind::Verification);
    let first = send(&app, get_request(&format!("/auth/verify-email/{token}"))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(&app, get_request(&format!("/auth/verify-email/{token}"))).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_identical() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;

    let (status_a, body_a) = login(&app, "ada@example.com", "wrong-password").await;
    let (status_b, body_b) = login(&app, "ghost@example.com", "Abcdef1!").await;
    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_a, status_b);
    assert_eq!(body_a["message"], body_b["message"]);
}

// Refresh rotation

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;
    let (_, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    let old_refresh = body["data"]["tokens"]["refreshToken"].as_str().unwrap().to_owned();

    let response = send(
        &app,
        post_json(
            "/auth/refresh-token",
            serde_json::json!({ "refreshToken": old_refresh }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    let new_refresh = body["data"]["tokens"]["refreshToken"].as_str().unwrap().to_owned();
    assert_ne!(new_refresh, old_refresh);

    // Replaying the rotated-out token fails
    let replay = send(
        &app,
        post_json(
            "/auth/refresh-token",
            serde_json::json!({ "refreshToken": old_refresh }),
        ),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body = body_to_json(replay.into_body()).await;
    assert_eq!(body["message"], "Invalid or expired refresh token");
    assert_eq!(body["code"], "INVALID_REFRESH_TOKEN");

    // The replacement still works
    let again = send(
        &app,
        post_json(
            "/auth/refresh-token",
            serde_json::json!({ "refreshToken": new_refresh }),
        ),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

// Logout

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;
    let (_, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    let access = body["data"]["tokens"]["accessToken"].as_str().unwrap().to_owned();
    let refresh = body["data"]["tokens"]["refreshToken"].as_str().unwrap().to_owned();

    let logout_request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {access}"))
        .body(Body::from(
            serde_json::json!({ "refreshToken": refresh }).to_string(),
        ))
        .unwrap();
    let response = send(&app, logout_request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let refresh_after = send(
        &app,
        post_json(
            "/auth/refresh-token",
            serde_json::json!({ "refreshToken": refresh }),
        ),
    )
    .await;
    assert_eq!(refresh_after.status(), StatusCode::UNAUTHORIZED);

    // Logout is idempotent
    let repeat = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {access}"))
        .body(Body::from(
            serde_json::json!({ "refreshToken": refresh }).to_string(),
        ))
        .unwrap();
    assert_eq!(send(&app, repeat).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = create_app(create_state(test_config()));

    let response = send(
        &app,
        post_json("/auth/logout", serde_json::json!({ "refreshToken": "x" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// Authenticated routes and rolling renewal

#[tokio::test]
async fn test_me_returns_current_account() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;
    let (_, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    let access = body["data"]["tokens"]["accessToken"].as_str().unwrap().to_owned();

    let response = send(&app, get_authed("/auth/me", &access)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["isVerified"], true);
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = create_app(create_state(test_config()));
    let response = send(&app, get_request("/auth/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_reports_token_expired() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;

    // Sign an already-expired token for the same account with the same secret
    let expired_signer = TokenSigner::new(
        SignerConfig::new("e2e-test-secret-32-bytes-long-key")
            .unwrap()
            .with_access_ttl(Duration::seconds(-60)),
    );
    let account = state
        .accounts
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    let expired = expired_signer.sign_access(&account).unwrap();

    let response = send(&app, get_authed("/auth/me", &expired)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_near_expiry_token_gets_silent_replacement() {
    // Renewal threshold above the access ttl, so every request renews
    let config = test_config().with_renew_threshold(Duration::minutes(30));
    let state = create_state(config);
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;
    let (_, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    let access = body["data"]["tokens"]["accessToken"].as_str().unwrap().to_owned();

    let response = send(&app, get_authed("/auth/me", &access)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let renewed = response
        .headers()
        .get(NEW_TOKEN_HEADER)
        .expect("renewal header missing")
        .to_str()
        .unwrap()
        .to_owned();

    // The replacement is usable as a bearer token
    let response = send(&app, get_authed("/auth/me", &renewed)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fresh_token_is_not_renewed() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;
    let (_, body) = login(&app, "ada@example.com", "Abcdef1!").await;
    let access = body["data"]["tokens"]["accessToken"].as_str().unwrap().to_owned();

    // Default 15 minute ttl against a 5 minute threshold
    let response = send(&app, get_authed("/auth/me", &access)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(NEW_TOKEN_HEADER).is_none());
}

// Password reset

#[tokio::test]
async fn test_forgot_and_reset_password_flow() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register_and_verify(&app, &state, "ada@example.com").await;

    let response = send(
        &app,
        post_json(
            "/auth/forgot-password",
            serde_json::json!({ "email": "ada@example.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let token = mailed_token(&state, "ada@example.com", MailKind::PasswordReset);
    let response = send(
        &app,
        post_json(
            &format!("/auth/reset-password/{token}"),
            serde_json::json!({ "password": "NewPass1!" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password is out, new one works
    let (status, _) = login(&app, "ada@example.com", "Abcdef1!").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "ada@example.com", "NewPass1!").await;
    assert_eq!(status, StatusCode::OK);

    // The reset link is spent
    let replay = send(
        &app,
        post_json(
            &format!("/auth/reset-password/{token}"),
            serde_json::json!({ "password": "Another1!" }),
        ),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let state = create_state(test_config());
    let app = create_app(state.clone());

    let response = send(
        &app,
        post_json(
            "/auth/forgot-password",
            serde_json::json!({ "email": "ghost@example.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(
        body["message"],
        "If the email exists, a password reset link has been sent"
    );
    assert!(state.mailer.sent.lock().unwrap().is_empty());
}

// Resend verification

#[tokio::test]
async fn test_resend_verification_issues_fresh_link() {
    let state = create_state(test_config());
    let app = create_app(state.clone());
    register(&app, "ada@example.com").await;
    let first = mailed_token(&state, "ada@example.com", MailKind::Verification);

    let response = send(
        &app,
        post_json(
            "/auth/resend-verification",
            serde_json::json!({ "email": "ada@example.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The first link is revoked, the fresh one verifies
    let stale = send(&app, get_request(&format!("/auth/verify-email/{first}"))).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let fresh = mailed_token(&state, "ada@example.com", MailKind::Verification);
    let response = send(&app, get_request(&format!("/auth/verify-email/{fresh}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// Role gate

async fn instructor_area(_guard: RoleGuard<InstructorOnly>) -> &'static str {
    "instructor area"
}

fn role_gated_app(state: TestState) -> Router {
    Router::new()
        .route("/instructor", get(instructor_area))
        .layer(axum::middleware::from_fn_with_state(
            state,
            authenticate::<MockAccountRepository, MockTokenLedger, MockMailer>,
        ))
}

fn seed_account(state: &TestState, email: &str, password: &str, roles: Vec<Role>) -> Account {
    let mut account = Account::mock(0, email);
    account.password_hash = hash_password(&SecretString::new(password)).unwrap();
    account.is_verified = true;
    account.roles = roles;

    let mut stored = state.accounts.accounts.lock().unwrap();
    account.id = stored.len() as i32 + 1;
    stored.push(account.clone());
    drop(stored);

    account
}

#[tokio::test]
async fn test_role_gate_forbids_students_and_admits_instructors() {
    let state = create_state(test_config());
    let student = seed_account(&state, "student@example.com", "Abcdef1!", vec![Role::Student]);
    let instructor = seed_account(
        &state,
        "teach@example.com",
        "Abcdef1!",
        vec![Role::Instructor],
    );
    let app = role_gated_app(state.clone());

    let student_token = state.signer.sign_access(&student).unwrap();
    let response = send(&app, get_authed("/instructor", &student_token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let instructor_token = state.signer.sign_access(&instructor).unwrap();
    let response = send(&app, get_authed("/instructor", &instructor_token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No token at all never reaches the guard
    let response = send(&app, get_request("/instructor")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_super_admin_passes_role_gate() {
    let state = create_state(test_config());
    let admin = seed_account(&state, "root@example.com", "Abcdef1!", vec![Role::SuperAdmin]);
    let app = role_gated_app(state.clone());

    let token = state.signer.sign_access(&admin).unwrap();
    let response = send(&app, get_authed("/instructor", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

use chrono::{Duration, Utc};
use std::sync::Arc;
use warbler::application_impl::*;
use warbler::application_port::*;
use warbler::domain_model::*;
use warbler::infra_memory::*;

struct Harness {
    service: RealAuthService,
    users: Arc<MemoryUserRepo>,
    alice: UserId,
}

async fn harness(platform: Platform) -> Harness {
    let users = Arc::new(MemoryUserRepo::new());
    let store = Arc::new(MemoryRefreshTokenStore::new());
    let hasher = Arc::new(Argon2PasswordHasher);

    let alice = UserId(uuid::Uuid::new_v4());
    let password_hash = hasher.hash_password("hunter2!").await.unwrap();
    users.insert(AccountRecord {
        user_id: alice,
        email: "alice@example.com".to_string(),
        password_hash,
        created_at: Utc::now(),
    });

    let codec = Arc::new(JwtHs256Codec::new(TokenConfig {
        issuer: "warbler".to_string(),
        access_ttl: Duration::hours(1),
        signing_key: b"integration-secret".to_vec(),
    }));

    let service = RealAuthService::new(
        users.clone(),
        hasher,
        codec,
        store,
        AuthPolicy {
            refresh_ttl: Duration::days(60),
            platform,
        },
    );

    Harness {
        service,
        users,
        alice,
    }
}

fn login_input(password: &str) -> LoginInput {
    LoginInput {
        email: "alice@example.com".to_string(),
        password: password.to_string(),
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn login_mints_both_tokens() {
    let h = harness(Platform::Dev).await;

    let result = h.service.login(login_input("hunter2!")).await.unwrap();
    assert_eq!(result.user_id, h.alice);
    assert_eq!(result.tokens.refresh_token.0.len(), 64);
    assert!(result.tokens.access_token_expires_at > Utc::now());
    assert!(result.tokens.refresh_token_expires_at > result.tokens.access_token_expires_at);

    // The freshly minted access token passes the authorization gate.
    let header = bearer(&result.tokens.access_token.0);
    let user = h.service.authorize(Some(&header)).await.unwrap();
    assert_eq!(user, h.alice);
}

#[tokio::test]
async fn wrong_password_issues_nothing() {
    let h = harness(Platform::Dev).await;

    let err = h.service.login(login_input("wrong")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn unknown_email_is_user_not_found() {
    let h = harness(Platform::Dev).await;
    let err = h
        .service
        .login(LoginInput {
            email: "nobody@example.com".to_string(),
            password: "hunter2!".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn refresh_mints_a_distinct_token_without_consuming() {
    let h = harness(Platform::Dev).await;
    let login = h.service.login(login_input("hunter2!")).await.unwrap();

    let header = bearer(&login.tokens.refresh_token.0);
    let grant_one = h.service.refresh(Some(&header)).await.unwrap();
    assert_ne!(grant_one.access_token.0, login.tokens.access_token.0);

    // Both access tokens stay independently valid.
    let old = bearer(&login.tokens.access_token.0);
    let new = bearer(&grant_one.access_token.0);
    assert_eq!(h.service.authorize(Some(&old)).await.unwrap(), h.alice);
    assert_eq!(h.service.authorize(Some(&new)).await.unwrap(), h.alice);

    // The refresh token was not rotated: it still works.
    let grant_two = h.service.refresh(Some(&header)).await.unwrap();
    assert_ne!(grant_two.access_token.0, grant_one.access_token.0);
}

#[tokio::test]
async fn each_login_mints_a_fresh_refresh_token() {
    let h = harness(Platform::Dev).await;
    let first = h.service.login(login_input("hunter2!")).await.unwrap();
    let second = h.service.login(login_input("hunter2!")).await.unwrap();
    assert_ne!(
        first.tokens.refresh_token.0,
        second.tokens.refresh_token.0
    );

    // The earlier session is untouched by the later login.
    let header = bearer(&first.tokens.refresh_token.0);
    assert!(h.service.refresh(Some(&header)).await.is_ok());
}

#[tokio::test]
async fn revoked_refresh_token_never_refreshes_again() {
    let h = harness(Platform::Dev).await;
    let login = h.service.login(login_input("hunter2!")).await.unwrap();
    let header = bearer(&login.tokens.refresh_token.0);

    h.service.revoke(Some(&header)).await.unwrap();

    let err = h.service.refresh(Some(&header)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));

    // Revoke stays idempotent.
    h.service.revoke(Some(&header)).await.unwrap();
    let err = h.service.refresh(Some(&header)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn revoking_an_unknown_token_reports_success() {
    let h = harness(Platform::Dev).await;
    let header = bearer(&"ab".repeat(32));
    h.service.revoke(Some(&header)).await.unwrap();
}

#[tokio::test]
async fn refresh_with_unknown_token_is_unauthorized() {
    let h = harness(Platform::Dev).await;
    let header = bearer(&"cd".repeat(32));
    let err = h.service.refresh(Some(&header)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn refresh_for_a_deleted_account_is_unauthorized() {
    let h = harness(Platform::Dev).await;
    let login = h.service.login(login_input("hunter2!")).await.unwrap();
    h.users.remove(h.alice);

    // Indistinguishable from a revoked or expired session.
    let header = bearer(&login.tokens.refresh_token.0);
    let err = h.service.refresh(Some(&header)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn authorize_rejects_non_bearer_headers() {
    let h = harness(Platform::Dev).await;
    let err = h.service.authorize(Some("Basic xyz")).await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedCredential));

    let err = h.service.authorize(None).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingCredential));
}

#[tokio::test]
async fn reset_terminates_sessions_on_dev_only() {
    let h = harness(Platform::Dev).await;
    let login = h.service.login(login_input("hunter2!")).await.unwrap();

    h.service.reset_sessions().await.unwrap();

    let header = bearer(&login.tokens.refresh_token.0);
    let err = h.service.refresh(Some(&header)).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn reset_is_forbidden_in_prod() {
    let h = harness(Platform::Prod).await;
    let login = h.service.login(login_input("hunter2!")).await.unwrap();

    let err = h.service.reset_sessions().await.unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));

    // Sessions survive the refused reset.
    let header = bearer(&login.tokens.refresh_token.0);
    assert!(h.service.refresh(Some(&header)).await.is_ok());
}

use serde_json::json;

use hairhub_backend::models::{Role, ServiceError};
use hairhub_backend::repositories::{NewUser, SqliteUserRepository, UserRepository};

mod common;
use common::{TestApp, PASSWORD};

#[actix_web::test]
async fn test_register_returns_token_pair() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "Ana@Example.com",
                "password": PASSWORD,
                "full_name": "Ana Gómez",
                "phone": "3001234567"
            })),
        )
        .await;

    assert_eq!(status, 200);
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["full_name"], "Ana Gómez");
    assert_eq!(body["role"], "CLIENT");
    assert_eq!(body["expires_in"], 3600);
}

#[actix_web::test]
async fn test_register_duplicate_email() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ANA@example.com",
                "password": PASSWORD,
                "full_name": "Otra Ana"
            })),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_register_rejects_short_password() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ana@example.com",
                "password": "123",
                "full_name": "Ana Gómez"
            })),
        )
        .await;

    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("Password"));
}

#[actix_web::test]
async fn test_register_missing_fields_is_bad_request() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app
        .call("POST", "/api/auth/register", None, Some(json!({ "email": "ana@example.com" })))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

#[actix_web::test]
async fn test_login_success() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "OWNER").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["role"], "OWNER");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_login_invalid_credentials() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrong_password" })),
        )
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Invalid"));
}

#[actix_web::test]
async fn test_login_is_rate_limited_after_five_attempts() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    for _ in 0..5 {
        let (status, _) = test_app
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "ana@example.com", "password": "wrong_password" })),
            )
            .await;
        assert_eq!(status, 401);
    }

    // Even the right password is refused until the window passes
    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, 429);
    assert_eq!(body["status"], 429);
}

#[actix_web::test]
async fn test_successful_login_resets_the_limit() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    for _ in 0..4 {
        test_app
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "ana@example.com", "password": "wrong_password" })),
            )
            .await;
    }
    test_app.login("ana@example.com", PASSWORD).await;

    for _ in 0..4 {
        let (status, _) = test_app
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "ana@example.com", "password": "wrong_password" })),
            )
            .await;
        assert_eq!(status, 401);
    }
}

#[actix_web::test]
async fn test_refresh_rotates_tokens() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (_, login) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;
    let first_refresh = login["refresh_token"].as_str().unwrap().to_string();

    let (status, refreshed) = test_app
        .call(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": first_refresh })),
        )
        .await;
    assert_eq!(status, 200);
    assert_ne!(refreshed["refresh_token"], login["refresh_token"]);

    // The rotated token is gone
    let (status, _) = test_app
        .call(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": first_refresh })),
        )
        .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_refresh_token_cannot_authenticate_requests() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (_, login) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let (status, _) = test_app
        .call("GET", "/api/users/me", Some(refresh_token), None)
        .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_protected_endpoint_requires_token() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app.call("GET", "/api/users/me", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let (status, _) = test_app
        .call("GET", "/api/users/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_logout_revokes_refresh_tokens() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (_, login) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let (status, _) = test_app.call("POST", "/api/auth/logout", Some(access), None).await;
    assert_eq!(status, 200);

    let (status, _) = test_app
        .call(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_forgot_password_does_not_reveal_unknown_email() {
    let test_app = TestApp::new().await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body.get("dev_reset_link").is_none());
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (status, body) = test_app
        .call(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
    assert_eq!(status, 200);

    let link = body["dev_reset_link"].as_str().unwrap();
    let token = link.split("token=").nth(1).unwrap().to_string();

    let outbox = test_app.state.email_service.sent_messages().await;
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "ana@example.com");

    let (status, _) = test_app
        .call(
            "GET",
            &format!("/api/auth/validate-reset-token?token={}", token),
            None,
            None,
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = test_app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, 200);

    test_app.login("ana@example.com", "brand-new-pass").await;

    // Tokens are single use
    let (status, _) = test_app
        .call(
            "GET",
            &format!("/api/auth/validate-reset-token?token={}", token),
            None,
            None,
        )
        .await;
    assert_eq!(status, 400);
    let (status, _) = test_app
        .call(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "new_password": "another-pass" })),
        )
        .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_forgot_password_is_rate_limited() {
    let test_app = TestApp::new().await;

    for _ in 0..3 {
        let (status, _) = test_app
            .call(
                "POST",
                "/api/auth/forgot-password",
                None,
                Some(json!({ "email": "ana@example.com" })),
            )
            .await;
        assert_eq!(status, 200);
    }

    let (status, _) = test_app
        .call(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
    assert_eq!(status, 429);
}

#[actix_web::test]
async fn test_cleanup_purges_expired_tokens() {
    let test_app = TestApp::new().await;
    let (_, user_id) = test_app.register("ana@example.com", "CLIENT").await;

    let expired = chrono::Utc::now().naive_utc() - chrono::Duration::days(1);
    sqlx::query("INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind("stale-refresh-token")
        .bind(expired)
        .execute(&test_app.pool)
        .await
        .unwrap();

    let (purged, _, _) = test_app.state.scheduler.run_cleanup_once().await;
    assert_eq!(purged, 1);

    // The live token issued at registration survives
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[actix_web::test]
async fn test_concurrent_refresh_consumes_token_once() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let (_, login) = test_app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": PASSWORD })),
        )
        .await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let auth_service = test_app.state.auth_service.clone();
    let (first, second) = tokio::join!(
        auth_service.refresh(refresh_token),
        auth_service.refresh(refresh_token)
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failed = if first.is_ok() { second } else { first };
    assert!(matches!(failed, Err(ServiceError::AuthenticationError(_))));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens")
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[actix_web::test]
async fn test_duplicate_email_insert_is_validation_error() {
    let test_app = TestApp::new().await;
    test_app.register("ana@example.com", "CLIENT").await;

    let users = SqliteUserRepository::new(test_app.pool.clone());
    let result = users
        .create(NewUser {
            email: "ana@example.com",
            password_hash: "not-a-real-hash",
            role: Role::Client,
            full_name: "Otra Ana",
            phone: None,
        })
        .await;

    match result {
        Err(ServiceError::ValidationError(message)) => {
            assert!(message.contains("already registered"))
        }
        other => panic!("expected a validation error, got {:?}", other.map(|u| u.id)),
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

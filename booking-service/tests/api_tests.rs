mod common;

use booking_service::config::AuthMode;
use booking_service::domain::user::models::UserId;
use booking_service::domain::user::ports::SessionStore;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use common::TEST_PASSWORD;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_user_success() {
    let app = TestApp::spawn().await;

    let body = app.register("nicola@example.com").await;

    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "nicola@example.com");
    assert_eq!(body["data"]["first_name"], "Nicola");
    assert_eq!(body["data"]["account_type"], "individual");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_user_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("nicola@example.com").await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "Nicola@Example.com",
            "password": "another!",
            "first_name": "Nicola",
            "last_name": "Bianchi"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_user_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "not-an-email",
            "password": TEST_PASSWORD,
            "first_name": "Nicola",
            "last_name": "Rossi"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("email"));
}

#[tokio::test]
async fn test_register_admin_is_forbidden() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "mallory@example.com",
            "password": TEST_PASSWORD,
            "first_name": "Mallory",
            "last_name": "Root",
            "account_type": "admin"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_system_account_is_forbidden() {
    let app = TestApp::spawn().await;
    let victim = app.register("victim@example.com").await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "mallory@example.com",
            "password": TEST_PASSWORD,
            "first_name": "Mallory",
            "last_name": "Service",
            "account_type": "system"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "mallory@example.com",
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.register("mallory@example.com").await;
    let token = app.login("mallory@example.com").await;
    let response = app
        .get_authenticated(
            &format!("/api/users/{}", victim["data"]["id"].as_str().unwrap()),
            &token,
        )
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let access_token = body["data"]["access_token"].as_str().unwrap();
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "nicola@example.com");

    let details = app.authenticator.validate_token(access_token).unwrap();
    assert_eq!(details.account_type, "individual");
    assert_eq!(
        body["data"]["user"]["id"].as_str().unwrap(),
        details.user_id.to_string()
    );
    assert_eq!(app.sessions.len().await, 2);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let unknown_email = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["data"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_me_with_valid_token() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;
    let token = app.login("nicola@example.com").await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "nicola@example.com");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let app = TestApp::spawn().await;

    for header in ["Bearer", "Basic abc", "Bearer a b", "token"] {
        let response = app
            .get("/api/auth/me")
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register("nicola@example.com").await;
    let user_id: u64 = user["data"]["id"].as_str().unwrap().parse().unwrap();

    let (token, claims) = app
        .authenticator
        .issuer()
        .issue_access_token_at(user_id, "individual", Utc::now() - Duration::hours(1))
        .unwrap();

    // Record the token as live so only its expiry can reject it.
    app.sessions
        .save_token_meta(
            claims.access_uuid,
            UserId(user_id),
            std::time::Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;
    let token = app.login("nicola@example.com").await;

    // Swap the first signature character, which carries no padding bits.
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let replacement = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", unsigned, replacement, &signature[1..]);

    let response = app
        .get_authenticated("/api/auth/me", &tampered)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;
    let token = app.login("nicola@example.com").await;

    let response = app
        .post_authenticated("/api/auth/logout", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unrecorded_token_rejected_when_tracking_sessions() {
    let app = TestApp::spawn().await;
    let user = app.register("nicola@example.com").await;
    let user_id: u64 = user["data"]["id"].as_str().unwrap().parse().unwrap();

    // Validly signed, but never handed out by login.
    let tokens = app.authenticator.generate_tokens(user_id, "individual").unwrap();

    let response = app
        .get_authenticated("/api/auth/me", &tokens.access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_other_user_is_forbidden() {
    let app = TestApp::spawn().await;
    let other = app.register("other@example.com").await;
    app.register("nicola@example.com").await;
    let token = app.login("nicola@example.com").await;

    let response = app
        .get_authenticated(
            &format!("/api/users/{}", other["data"]["id"].as_str().unwrap()),
            &token,
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let app = TestApp::spawn().await;
    app.register("nicola@example.com").await;
    let token = app.login("nicola@example.com").await;

    let response = app
        .get_authenticated("/api/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Insufficient permissions");
}

#[tokio::test]
async fn test_admin_lists_and_deletes_users() {
    let app = TestApp::spawn().await;
    let user = app.register("nicola@example.com").await;
    app.seed_admin("admin@example.com").await;
    let token = app.login("admin@example.com").await;

    let response = app
        .get_authenticated("/api/users", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let path = format!("/api/users/{}", user["data"]["id"].as_str().unwrap());
    let response = app
        .delete_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cookie_mode_login_and_logout() {
    let app = TestApp::spawn_with(AuthMode::Cookie).await;
    app.register("nicola@example.com").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // The client's cookie store replays the session cookie.
    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post("/api/auth/logout")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

//! Session context transitions against a mocked service.

mod common;

use common::{Harness, USER_JSON};
use mockito::{Matcher, Server};
use serde_json::json;
use strayward_core::auth::context::{LOGIN_AFTER_SIGNUP_FAILED, LOGIN_FAILED};
use strayward_core::auth::{AuthState, SessionContext, TokenKind, TokenStore};

#[tokio::test]
async fn login_stores_tokens_and_authenticates() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"email": "a@b.com", "password": "pw"})))
        .with_status(200)
        .with_body(r#"{"access_token": "T1", "refresh_token": "R1", "token_type": "bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/api/me")
        .match_header("authorization", "Bearer T1")
        .with_status(200)
        .with_body(r#"{"id": 1, "email": "a@b.com", "full_name": "A"}"#)
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);

    ctx.login("a@b.com", "pw").await.expect("Login should succeed");

    login.assert_async().await;
    me.assert_async().await;
    let user = ctx.current_user().expect("User should be present");
    assert_eq!(user.id, 1);
    assert!(ctx.state().is_authenticated());
    assert_eq!(harness.store.get(TokenKind::Access).as_deref(), Some("T1"));
    assert_eq!(harness.store.get(TokenKind::Refresh).as_deref(), Some("R1"));
}

#[tokio::test]
async fn failed_login_reports_server_detail_and_keeps_state() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(r#"{"detail": "Incorrect email or password"}"#)
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);
    assert_eq!(ctx.check_auth().await, AuthState::Anonymous);

    let err = ctx.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err, "Incorrect email or password");
    assert_eq!(ctx.state(), AuthState::Anonymous);
    assert_eq!(harness.store.session().access_token, None);
}

#[tokio::test]
async fn failed_login_without_detail_uses_fallback() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/api/auth/login")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);

    let err = ctx.login("a@b.com", "pw").await.unwrap_err();
    assert_eq!(err, LOGIN_FAILED);
    assert_eq!(ctx.state(), AuthState::Unknown);
}

#[tokio::test]
async fn check_auth_without_token_is_anonymous_and_offline() {
    let mut server = Server::new_async().await;
    let me = server.mock("GET", "/api/me").expect(0).create_async().await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);
    assert!(ctx.is_loading());

    assert_eq!(ctx.check_auth().await, AuthState::Anonymous);
    assert!(!ctx.is_loading());
    me.assert_async().await;
}

#[tokio::test]
async fn check_auth_with_valid_token_authenticates() {
    let mut server = Server::new_async().await;
    let _me = server
        .mock("GET", "/api/me")
        .match_header("authorization", "Bearer T1")
        .with_status(200)
        .with_body(USER_JSON)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some("T1"), Some("R1"));
    let ctx = SessionContext::new(&harness.api);
    let mut changes = ctx.subscribe();

    let state = ctx.check_auth().await;
    assert_eq!(state.user().map(|u| u.id), Some(1));
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().is_authenticated());
}

#[tokio::test]
async fn check_auth_with_rejected_session_clears_tokens() {
    let mut server = Server::new_async().await;
    let _me = server
        .mock("GET", "/api/me")
        .with_status(401)
        .create_async()
        .await;
    let _refresh = server
        .mock("POST", "/api/auth/refresh")
        .with_status(401)
        .with_body(r#"{"detail": "Could not validate refresh token"}"#)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some("OLD"), Some("R1"));
    let ctx = SessionContext::new(&harness.api);

    assert_eq!(ctx.check_auth().await, AuthState::Anonymous);
    assert_eq!(harness.store.session().access_token, None);
    assert_eq!(harness.store.session().refresh_token, None);
}

#[tokio::test]
async fn logout_clears_session_even_when_remote_fails() {
    let mut server = Server::new_async().await;
    let _me = server
        .mock("GET", "/api/me")
        .with_status(200)
        .with_body(USER_JSON)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/auth/logout")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some("T1"), Some("R1"));
    let ctx = SessionContext::new(&harness.api);
    assert!(ctx.check_auth().await.is_authenticated());

    ctx.logout().await;

    logout.assert_async().await;
    assert_eq!(ctx.state(), AuthState::Anonymous);
    assert_eq!(harness.store.get(TokenKind::Access), None);
    assert_eq!(harness.store.get(TokenKind::Refresh), None);
}

#[tokio::test]
async fn signup_does_not_change_session_state() {
    let mut server = Server::new_async().await;
    let signup = server
        .mock("POST", "/api/auth/signup")
        .match_body(Matcher::Json(json!({
            "email": "new@b.com",
            "password": "pw",
            "full_name": "New User"
        })))
        .with_status(201)
        .with_body(r#"{"id": 5, "email": "new@b.com", "full_name": "New User", "is_admin": false, "is_active": true, "created_at": "2024-05-01T10:20:30"}"#)
        .expect(2)
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);

    ctx.signup("new@b.com", "pw", "New User").await.expect("Signup should succeed");
    assert_eq!(ctx.state(), AuthState::Unknown);

    ctx.check_auth().await;
    ctx.signup("new@b.com", "pw", "New User").await.expect("Signup should succeed");
    assert_eq!(ctx.state(), AuthState::Anonymous);
    assert_eq!(harness.store.session().access_token, None);
    signup.assert_async().await;
}

#[tokio::test]
async fn signup_error_reports_detail() {
    let mut server = Server::new_async().await;
    let _signup = server
        .mock("POST", "/api/auth/signup")
        .with_status(400)
        .with_body(r#"{"detail": "Email already registered"}"#)
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);

    let err = ctx.signup("a@b.com", "pw", "A").await.unwrap_err();
    assert_eq!(err, "Email already registered");
}

#[tokio::test]
async fn signup_and_login_reports_login_failure_separately() {
    let mut server = Server::new_async().await;
    let _signup = server
        .mock("POST", "/api/auth/signup")
        .with_status(201)
        .with_body(USER_JSON)
        .create_async()
        .await;
    let _login = server
        .mock("POST", "/api/auth/login")
        .with_status(403)
        .with_body(r#"{"detail": "Inactive user"}"#)
        .create_async()
        .await;

    let harness = Harness::new(&server, None, None);
    let ctx = SessionContext::new(&harness.api);

    let err = ctx.signup_and_login("a@b.com", "pw", "A").await.unwrap_err();
    assert_eq!(err, LOGIN_AFTER_SIGNUP_FAILED);
    assert!(!ctx.state().is_authenticated());
}

#[tokio::test]
async fn update_user_makes_no_remote_calls() {
    let mut server = Server::new_async().await;
    let me = server
        .mock("GET", "/api/me")
        .with_status(200)
        .with_body(USER_JSON)
        .expect(1)
        .create_async()
        .await;
    let profile = server
        .mock("PATCH", "/api/users/me")
        .match_body(Matcher::Json(json!({"full_name": "Renamed"})))
        .with_status(200)
        .with_body(r#"{"id": 1, "email": "a@b.com", "full_name": "Renamed"}"#)
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some("T1"), Some("R1"));
    let ctx = SessionContext::new(&harness.api);
    ctx.check_auth().await;

    let update = strayward_core::models::ProfileUpdate {
        full_name: Some("Renamed".to_string()),
        email: None,
    };
    let updated = harness.api.auth().update_profile(&update).await.unwrap();

    ctx.update_user(updated.clone());
    let first = ctx.current_user();
    ctx.update_user(updated);
    let second = ctx.current_user();

    assert_eq!(first, second);
    assert_eq!(second.map(|u| u.full_name).as_deref(), Some("Renamed"));
    me.assert_async().await;
    profile.assert_async().await;
}

#[tokio::test]
async fn delete_account_tears_down_session() {
    let mut server = Server::new_async().await;
    let _me = server
        .mock("GET", "/api/me")
        .with_status(200)
        .with_body(USER_JSON)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/users/me")
        .match_header("authorization", "Bearer T1")
        .with_status(200)
        .with_body(r#"{"message": "Account deleted successfully"}"#)
        .expect(1)
        .create_async()
        .await;

    let harness = Harness::new(&server, Some("T1"), Some("R1"));
    let ctx = SessionContext::new(&harness.api);
    ctx.check_auth().await;

    ctx.delete_account().await.expect("Delete should succeed");

    delete.assert_async().await;
    assert_eq!(ctx.state(), AuthState::Anonymous);
    assert_eq!(harness.store.session().access_token, None);
}

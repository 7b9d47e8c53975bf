use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use crate::auth::IdentityAuth;

use super::*;

fn mock_console(server: &MockServer) -> Console {
    let auth = Arc::new(IdentityAuth::new_with_url("test-api-key", server.url("")));
    Console::new(auth)
}

#[tokio::test]
async fn test_login_round_trip() {
    let server = MockServer::start();
    let mut console = mock_console(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/accounts:signInWithPassword")
            .json_body_includes(json!({"email": "ada@example.com"}).to_string());
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "u-123",
                "email": "ada@example.com",
                "idToken": "id-token-abc",
                "refreshToken": "refresh-xyz",
                "expiresIn": "3600"
            }));
    });

    assert!(!console.is_signed_in());
    assert_eq!(console.tab(), Tab::Firestore);

    console.login_mut().email = "ada@example.com".to_string();
    console.login_mut().password = "hunter2".to_string();
    console.submit_login().await;

    assert!(console.is_signed_in());
    assert_eq!(console.login(), &LoginForm::default());

    console.select_tab(Tab::Storage);
    assert_eq!(console.tab(), Tab::Storage);

    console.sign_out();
    assert!(!console.is_signed_in());
}

#[tokio::test]
async fn test_failed_login_clears_only_the_password() {
    let server = MockServer::start();
    let mut console = mock_console(&server);

    server.mock(|when, then| {
        when.method(POST).path("/accounts:signInWithPassword");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {"code": 400, "message": "INVALID_PASSWORD"}
            }));
    });

    console.login_mut().email = "ada@example.com".to_string();
    console.login_mut().password = "wrong".to_string();
    console.submit_login().await;

    assert!(!console.is_signed_in());
    assert_eq!(console.login().email, "ada@example.com");
    assert!(console.login().password.is_empty());
    assert_eq!(console.login().error.as_deref(), Some("Failed to log in"));
}

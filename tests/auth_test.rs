use spotcache::{
    Error,
    management::{AuthManager, EXPIRY_MARGIN},
    spotify::connection::error_message,
    types::{Authentication, TokenResponse},
};

fn authentication() -> Authentication {
    Authentication {
        client_id: "client".to_string(),
        client_secret: None,
        scope: "user-library-read".to_string(),
        show_dialog: false,
        refresh_token: Some("refresh-1".to_string()),
        token: Some("token-1".to_string()),
        token_expires: 10_000,
    }
}

fn response(refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "token-2".to_string(),
        token_type: "Bearer".to_string(),
        scope: None,
        expires_in: 3600,
        refresh_token: refresh_token.map(str::to_string),
    }
}

#[test]
fn test_token_expires_four_minutes_early() {
    let manager = AuthManager::with_path(authentication(), "unused.json");
    assert!(!manager.is_expired_at(10_000 - EXPIRY_MARGIN - 1));
    assert!(manager.is_expired_at(10_000 - EXPIRY_MARGIN));
    assert!(manager.is_expired_at(20_000));
}

#[test]
fn test_apply_keeps_refresh_token_when_none_is_returned() {
    let mut manager = AuthManager::with_path(authentication(), "unused.json");
    manager.apply_at(response(None), 1_000);

    let auth = manager.authentication();
    assert_eq!(auth.token.as_deref(), Some("token-2"));
    assert_eq!(auth.token_expires, 4_600);
    assert_eq!(auth.refresh_token.as_deref(), Some("refresh-1"));

    manager.apply_at(response(Some("refresh-2")), 1_000);
    assert_eq!(
        manager.authentication().refresh_token.as_deref(),
        Some("refresh-2")
    );
}

#[tokio::test]
async fn test_persist_and_load_authentication() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("authentication.json");

    let manager = AuthManager::with_path(authentication(), &path);
    manager.persist().await.expect("persist");

    let loaded = AuthManager::load_from(&path).await.expect("load");
    assert_eq!(loaded.authentication(), &authentication());
    assert_eq!(loaded.path(), path.as_path());
}

#[tokio::test]
async fn test_load_missing_authentication_is_an_auth_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = AuthManager::load_from(dir.path().join("missing.json")).await;
    assert!(matches!(result, Err(Error::Auth(_))));
}

#[test]
fn test_error_message_extraction() {
    assert_eq!(
        error_message(r#"{"error":{"status":401,"message":"The access token expired"}}"#),
        "The access token expired"
    );
    assert_eq!(
        error_message(r#"{"error":"invalid_grant"}"#),
        "invalid_grant"
    );
    assert_eq!(error_message("Bad gateway"), "Bad gateway");
}

#[test]
fn test_status_mapping() {
    assert!(matches!(Error::from_status(304, ""), Some(Error::NotModified(_))));
    assert!(matches!(Error::from_status(400, ""), Some(Error::BadRequest(_))));
    assert!(matches!(Error::from_status(401, ""), Some(Error::InvalidToken(_))));
    assert!(matches!(Error::from_status(403, ""), Some(Error::Forbidden(_))));
    assert!(matches!(Error::from_status(404, ""), Some(Error::NotFound(_))));
    assert!(matches!(Error::from_status(429, ""), Some(Error::RateLimited)));
    assert!(matches!(
        Error::from_status(500, ""),
        Some(Error::InternalServerError(_))
    ));
    assert!(Error::from_status(200, "").is_none());

    assert!(Error::DataShape(String::new()).is_stale());
    assert!(!Error::NotFound(String::new()).is_stale());
}

//! Unit tests for config.rs module

use std::io::Write;

use message_board::auth::AuthContext;
use message_board::config::AppConfig;
use message_board::names::InsertNamePolicy;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_default_store_config() {
    let config = AppConfig::default();

    assert_eq!(config.store.url, "http://localhost:54321");
    assert_eq!(config.store.anon_key, "");
    assert_eq!(config.store.messages_table, "messages");
    assert_eq!(config.store.profiles_table, "profiles");
    assert_eq!(config.store.timeout_secs, 30);
}

#[test]
fn test_default_board_and_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.board.page_size, 50);
    assert_eq!(config.board.insert_name, "email");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.auth.user_id, None);
}

#[test]
fn test_config_validation_success() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_config_validation_bad_url() {
    let mut config = AppConfig::default();
    config.store.url = "ftp://example.com".to_string();
    assert!(config.validate().is_err());

    config.store.url = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_bad_table_name() {
    let mut config = AppConfig::default();
    config.store.messages_table = "messages?select=*".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_page_size_bounds() {
    let mut config = AppConfig::default();
    config.board.page_size = 0;
    assert!(config.validate().is_err());

    config.board.page_size = 1001;
    assert!(config.validate().is_err());

    config.board.page_size = 1000;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_insert_name_policy() {
    let mut config = AppConfig::default();
    config.board.insert_name = "profile".to_string();
    assert_eq!(config.insert_name_policy().unwrap(), InsertNamePolicy::Profile);

    config.board.insert_name = "nickname".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_auth_requires_user_id() {
    let mut config = AppConfig::default();
    config.auth.access_token = Some("jwt".to_string());
    assert!(config.validate().is_err());

    config.auth.user_id = Some("u1".to_string());
    assert!(config.validate().is_ok());

    config.auth.email = Some("not-an-email".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_logging() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_session_from_auth_section() {
    let mut config = AppConfig::default();
    assert!(config.session().current_user().is_none());
    assert!(config.session().access_token().is_none());

    config.auth.user_id = Some("u1".to_string());
    config.auth.email = Some("a@x.com".to_string());
    config.auth.access_token = Some("jwt".to_string());
    let session = config.session();
    let user = session.current_user().unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email.as_deref(), Some("a@x.com"));
    assert_eq!(session.access_token(), Some("jwt"));
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let file = write_config(
        r#"
[store]
url = "https://abc.supabase.co"
anon_key = "public-anon-key"

[board]
page_size = 20
insert_name = "profile"

[auth]
user_id = "u1"
email = "a@x.com"
"#,
    );

    let config = AppConfig::load_from(Some(file.path())).unwrap();
    assert_eq!(config.store.url, "https://abc.supabase.co");
    assert_eq!(config.store.anon_key, "public-anon-key");
    assert_eq!(config.store.messages_table, "messages");
    assert_eq!(config.board.page_size, 20);
    assert_eq!(config.insert_name_policy().unwrap(), InsertNamePolicy::Profile);
    assert_eq!(config.auth.user_id.as_deref(), Some("u1"));
    assert_eq!(config.auth.access_token, None);
}

#[test]
fn test_load_from_file_rejects_invalid_values() {
    let file = write_config(
        r#"
[board]
page_size = 0
"#,
    );
    assert!(AppConfig::load_from(Some(file.path())).is_err());
}

#[test]
fn test_load_from_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(AppConfig::load_from(Some(&missing)).is_err());
}

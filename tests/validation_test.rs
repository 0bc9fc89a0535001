//! Unit tests for validation.rs module

use message_board::validation::{InputValidator, MAX_PAGE_SIZE};

#[test]
fn test_is_postable_plain_text() {
    assert!(InputValidator::is_postable("hello"));
}

#[test]
fn test_is_postable_with_surrounding_whitespace() {
    assert!(InputValidator::is_postable("  hello  "));
}

#[test]
fn test_is_postable_empty() {
    assert!(!InputValidator::is_postable(""));
}

#[test]
fn test_is_postable_whitespace_only() {
    assert!(!InputValidator::is_postable("   "));
    assert!(!InputValidator::is_postable("\n\t \r\n"));
}

#[test]
fn test_validate_message_id_valid() {
    assert!(InputValidator::validate_message_id("42").is_ok());
    assert!(InputValidator::validate_message_id("0b5c1a9e-7f1d-4c53-9a57-2f1e0c8b9d10").is_ok());
}

#[test]
fn test_validate_message_id_empty() {
    assert!(InputValidator::validate_message_id("").is_err());
    assert!(InputValidator::validate_message_id("  ").is_err());
}

#[test]
fn test_validate_message_id_too_long() {
    assert!(InputValidator::validate_message_id(&"a".repeat(129)).is_err());
    assert!(InputValidator::validate_message_id(&"a".repeat(128)).is_ok());
}

#[test]
fn test_validate_message_id_control_chars() {
    assert!(InputValidator::validate_message_id("4\n2").is_err());
    assert!(InputValidator::validate_message_id("4\02").is_err());
}

#[test]
fn test_validate_email_valid() {
    assert!(InputValidator::validate_email("a@x.com").is_ok());
    assert!(InputValidator::validate_email("first.last@example.co.uk").is_ok());
}

#[test]
fn test_validate_email_missing_at() {
    assert!(InputValidator::validate_email("a.x.com").is_err());
}

#[test]
fn test_validate_email_multiple_at() {
    assert!(InputValidator::validate_email("a@b@x.com").is_err());
}

#[test]
fn test_validate_email_bad_parts() {
    assert!(InputValidator::validate_email("@x.com").is_err());
    assert!(InputValidator::validate_email("a@localhost").is_err());
    assert!(InputValidator::validate_email(&format!("{}@x.com", "a".repeat(65))).is_err());
}

#[test]
fn test_validate_store_url_valid() {
    assert!(InputValidator::validate_store_url("https://abc.supabase.co").is_ok());
    assert!(InputValidator::validate_store_url("http://localhost:54321").is_ok());
}

#[test]
fn test_validate_store_url_invalid() {
    assert!(InputValidator::validate_store_url("").is_err());
    assert!(InputValidator::validate_store_url("abc.supabase.co").is_err());
    assert!(InputValidator::validate_store_url("ftp://abc.supabase.co").is_err());
}

#[test]
fn test_validate_table_name() {
    assert!(InputValidator::validate_table_name("messages").is_ok());
    assert!(InputValidator::validate_table_name("board_profiles_v2").is_ok());
    assert!(InputValidator::validate_table_name("").is_err());
    assert!(InputValidator::validate_table_name("messages/../profiles").is_err());
    assert!(InputValidator::validate_table_name("messages?id=eq.1").is_err());
}

#[test]
fn test_validate_page_size() {
    assert!(InputValidator::validate_page_size(1).is_ok());
    assert!(InputValidator::validate_page_size(MAX_PAGE_SIZE).is_ok());
    assert!(InputValidator::validate_page_size(0).is_err());
    assert!(InputValidator::validate_page_size(MAX_PAGE_SIZE + 1).is_err());
}

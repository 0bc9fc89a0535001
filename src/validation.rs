use anyhow::{anyhow, Result};
use reqwest::Url;

/// Largest page the board will request in one call
pub const MAX_PAGE_SIZE: usize = 1000;

/// Validation utilities for drafts, identifiers and configuration values
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Whether a draft may be posted: non-empty once trimmed.
    ///
    /// The draft is checked, never rewritten; the untrimmed text is what gets
    /// stored.
    #[must_use]
    pub fn is_postable(draft: &str) -> bool {
        !draft.trim().is_empty()
    }

    /// Validate a message id before it is put into a delete filter
    pub fn validate_message_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(anyhow!("Message id cannot be empty"));
        }

        if id.len() > 128 {
            return Err(anyhow!("Message id too long (max 128 characters)"));
        }

        if id.chars().any(char::is_control) {
            return Err(anyhow!("Message id contains invalid characters"));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(anyhow!("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(anyhow!("Email too long (max 254 characters)"));
        }

        let Some((local_part, domain_part)) = email.split_once('@') else {
            return Err(anyhow!("Email must contain @ symbol"));
        };

        if domain_part.contains('@') {
            return Err(anyhow!("Email must have exactly one @ symbol"));
        }

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(anyhow!("Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(anyhow!("Email domain invalid"));
        }

        Ok(())
    }

    /// Validate the store base URL
    pub fn validate_store_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(anyhow!("Store URL cannot be empty"));
        }

        let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid store URL {url}: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Store URL must use http or https, got {}", parsed.scheme()));
        }

        if parsed.host_str().is_none() {
            return Err(anyhow!("Store URL has no host"));
        }

        Ok(())
    }

    /// Validate a table name used in a REST path
    pub fn validate_table_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(anyhow!("Table name cannot be empty"));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(anyhow!("Table name contains invalid characters: {name}"));
        }

        Ok(())
    }

    /// Validate page size
    pub fn validate_page_size(size: usize) -> Result<()> {
        if size == 0 {
            return Err(anyhow!("Page size must be greater than 0"));
        }

        if size > MAX_PAGE_SIZE {
            return Err(anyhow!("Page size too large (max {MAX_PAGE_SIZE})"));
        }

        Ok(())
    }
}

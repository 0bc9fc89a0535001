use anyhow::{anyhow, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::auth::StaticAuth;
use crate::models::CurrentUser;
use crate::names::InsertNamePolicy;
use crate::validation::InputValidator;

/// Prefix for environment overrides, e.g. `MESSAGE_BOARD__STORE__URL`
pub const ENV_PREFIX: &str = "MESSAGE_BOARD";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote message store connection
    pub store: StoreConfig,
    /// View behaviour
    pub board: BoardConfig,
    /// Session handed to the board
    #[serde(default)]
    pub auth: AuthConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// Remote message store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project base URL; the REST endpoint lives under `/rest/v1`
    pub url: String,
    /// Public (anon) API key sent as `apikey`
    pub anon_key: String,
    /// Table holding the messages
    pub messages_table: String,
    /// Table holding author profiles
    pub profiles_table: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

/// View behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Messages fetched per page
    pub page_size: usize,
    /// Name source for freshly posted messages: "email" or "profile"
    pub insert_name: String,
}

/// Session settings. Authentication happens elsewhere; this only carries its result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signed-in account id
    pub user_id: Option<String>,
    /// Signed-in account email
    pub email: Option<String>,
    /// Access token issued for the session
    pub access_token: Option<String>,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level filter when `RUST_LOG` is unset
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// Optional log file; rotated daily
    pub file_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                messages_table: "messages".to_string(),
                profiles_table: "profiles".to_string(),
                timeout_secs: 30,
            },
            board: BoardConfig {
                page_size: 50,
                insert_name: "email".to_string(),
            },
            auth: AuthConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                file_path: None,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration with precedence: defaults, `config/default`,
    /// `config/local`, the explicit file (required when given), then environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        for (key, value) in AppConfig::default().default_values() {
            builder = builder.set_default(key, value)?;
        }

        builder = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_store_url(&self.store.url)?;
        InputValidator::validate_table_name(&self.store.messages_table)?;
        InputValidator::validate_table_name(&self.store.profiles_table)?;
        if self.store.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than 0"));
        }

        InputValidator::validate_page_size(self.board.page_size)?;
        self.insert_name_policy()?;

        if self.auth.user_id.is_none() && (self.auth.email.is_some() || self.auth.access_token.is_some()) {
            return Err(anyhow!("auth.email and auth.access_token require auth.user_id"));
        }
        if let Some(email) = &self.auth.email {
            InputValidator::validate_email(email)?;
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Parsed insert-name policy
    pub fn insert_name_policy(&self) -> Result<InsertNamePolicy> {
        self.board.insert_name.parse()
    }

    /// Session described by the `auth` section
    #[must_use]
    pub fn session(&self) -> StaticAuth {
        match &self.auth.user_id {
            Some(id) => StaticAuth::signed_in(
                CurrentUser {
                    id: id.clone(),
                    email: self.auth.email.clone(),
                },
                self.auth.access_token.clone(),
            ),
            None => StaticAuth::anonymous(),
        }
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Flatten into `section.key` defaults for the config builder.
    fn default_values(self) -> Vec<(&'static str, config::Value)> {
        let mut values = vec![
            ("store.url", config::Value::from(self.store.url)),
            ("store.anon_key", config::Value::from(self.store.anon_key)),
            ("store.messages_table", config::Value::from(self.store.messages_table)),
            ("store.profiles_table", config::Value::from(self.store.profiles_table)),
            ("store.timeout_secs", config::Value::from(to_i64(self.store.timeout_secs))),
            ("board.page_size", config::Value::from(to_i64(self.board.page_size as u64))),
            ("board.insert_name", config::Value::from(self.board.insert_name)),
            ("logging.level", config::Value::from(self.logging.level)),
            ("logging.format", config::Value::from(self.logging.format)),
        ];

        let optional = [
            ("auth.user_id", self.auth.user_id),
            ("auth.email", self.auth.email),
            ("auth.access_token", self.auth.access_token),
            ("logging.file_path", self.logging.file_path),
        ];
        values.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, config::Value::from(v)))),
        );

        values
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store.messages_table, "messages");
        assert_eq!(config.board.page_size, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.store.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values_skip_unset_options() {
        let keys: Vec<_> = AppConfig::default().default_values().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"store.url"));
        assert!(!keys.contains(&"auth.user_id"));
    }
}

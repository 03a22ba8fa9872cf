// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. Secrets never appear in `Debug`
//! output.

use std::env;
use std::fmt;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// Parse `APP_ENV`. Anything other than `development` is production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Which order store to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// A configuration value that must not be logged.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<unset>)")
        } else {
            f.write_str("Secret(<redacted>)")
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Production or development
    pub environment: Environment,
    /// Mini App origin, allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Order store backend
    pub store_backend: StoreBackend,
    /// Telegram chat that receives new-order notifications
    pub admin_chat_id: Option<i64>,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Telegram bot token; verifies init data
    pub bot_token: Secret,
    /// Shared admin password; empty disables admin login
    pub admin_password: Secret,
    /// HS256 key for admin session tokens (raw bytes)
    pub admin_session_key: Vec<u8>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("store_backend", &self.store_backend)
            .field("admin_chat_id", &self.admin_chat_id)
            .field("port", &self.port)
            .field("bot_token", &self.bot_token)
            .field("admin_password", &self.admin_password)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::parse(&env::var("APP_ENV").unwrap_or_default());

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StoreBackend::Firestore,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let admin_chat_id = match env::var("ADMIN_CHAT_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("ADMIN_CHAT_ID"))?,
            ),
            _ => None,
        };

        let admin_password = Secret::new(env::var("ADMIN_PASSWORD").unwrap_or_default());
        let admin_session_key = match env::var("ADMIN_SESSION_KEY") {
            Ok(key) if !key.trim().is_empty() => key.trim().as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "ADMIN_SESSION_KEY not set; using a per-process key, admin sessions end on restart"
                );
                random_session_key()
            }
        };

        Ok(Self {
            environment,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend,
            admin_chat_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            bot_token: Secret::new(env::var("BOT_TOKEN").unwrap_or_default()),
            admin_password,
            admin_session_key,
        })
    }

    /// Config for tests: development mode, in-memory store, known secrets.
    pub fn test_default() -> Self {
        let admin_password = Secret::new("test_admin_password");
        Self {
            environment: Environment::Development,
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            admin_chat_id: None,
            port: 8080,
            bot_token: Secret::new("123456:TEST-TOKEN"),
            admin_session_key: b"test_admin_session_key_32_bytes!".to_vec(),
            admin_password,
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

/// 32 bytes from the OS RNG (two v4 UUIDs), never derived from other config.
fn random_session_key() -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    key
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse(" Development "), Environment::Development);
        assert_eq!(Environment::parse("dev"), Environment::Production);
        assert_eq!(Environment::parse("local"), Environment::Production);
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(""), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Production);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("BOT_TOKEN", " 42:abc ");
        env::set_var("APP_ENV", "development");
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("ADMIN_CHAT_ID", "-100123");
        env::set_var("ADMIN_PASSWORD", "hunter2");
        env::remove_var("ADMIN_SESSION_KEY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.bot_token.expose(), "42:abc");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.admin_chat_id, Some(-100123));
        assert_eq!(config.admin_session_key.len(), 32);
        assert!(!config.secure_cookies());

        // Same password, no explicit key: each process gets its own key.
        let again = Config::from_env().expect("Config should load");
        assert_ne!(config.admin_session_key, again.admin_session_key);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Config::test_default());
        assert!(!rendered.contains("TEST-TOKEN"));
        assert!(!rendered.contains("test_admin_password"));
        assert!(rendered.contains("Secret(<redacted>)"));
    }

    #[test]
    fn test_fallback_session_key_is_not_derivable() {
        let a = random_session_key();
        let b = random_session_key();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}

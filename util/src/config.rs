//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub qr_code_ttl_minutes: u64,
    pub certificate_base_url: String,
    pub certificate_prefix: String,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparseable config value; using default");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "campus-connect".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").expect("DATABASE_PATH is required"),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parse_or("PORT", 3000),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET is required"),
            jwt_duration_minutes: parse_or("JWT_DURATION_MINUTES", 60),
            qr_code_ttl_minutes: parse_or("QR_CODE_TTL_MINUTES", 15),
            certificate_base_url: env::var("CERTIFICATE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/certificates".into()),
            certificate_prefix: env::var("CERTIFICATE_PREFIX").unwrap_or_else(|_| "CC".into()),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value.into());
    }

    pub fn set_qr_code_ttl_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.qr_code_ttl_minutes = value.into());
    }

    pub fn set_certificate_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.certificate_base_url = value.into());
    }

    pub fn set_certificate_prefix(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.certificate_prefix = value.into());
    }
}

// --- Free accessors, read through the singleton ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn qr_code_ttl_minutes() -> u64 {
    AppConfig::global().qr_code_ttl_minutes
}

pub fn certificate_base_url() -> String {
    AppConfig::global().certificate_base_url.clone()
}

pub fn certificate_prefix() -> String {
    AppConfig::global().certificate_prefix.clone()
}

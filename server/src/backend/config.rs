//! # Configuration
//!
//! Runtime settings read from environment variables. Every setting has a
//! default except the bootstrap password, which the CLI asks for only when
//! it needs it.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::Duration;

use crate::backend::domain::session_policy::DEFAULT_IDLE_MINUTES;
use crate::backend::domain::streak_calculator::DEFAULT_MAX_SERVICES_FOR_STREAK;
use crate::backend::domain::user_service::DEFAULT_SYSTEM_USER;
use crate::backend::storage::connection::DEFAULT_DATABASE_URL;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

/// Idle sessions stay in the session store this many idle thresholds, so the
/// guard still sees them and can answer with the inactivity notice.
pub const SESSION_RETENTION_FACTOR: i64 = 4;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive whole number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be a socket address like 127.0.0.1:3000, got '{value}'")]
    InvalidAddress { key: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Source of environment variables, swappable in tests
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvironmentProvider for MapEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub idle_minutes: i64,
    pub max_services_for_streak: usize,
    pub system_username: String,
    /// Mark the session cookie `Secure`; on for production deployments
    pub secure_cookies: bool,
    pub cors_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            idle_minutes: DEFAULT_IDLE_MINUTES,
            max_services_for_streak: DEFAULT_MAX_SERVICES_FOR_STREAK,
            system_username: DEFAULT_SYSTEM_USER.to_string(),
            secure_cookies: false,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_provider(&SystemEnvironment)
    }

    pub fn from_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match non_empty(env, "BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidAddress { key: "BIND_ADDR", value })?,
            None => defaults.bind_addr,
        };

        let production = non_empty(env, "APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"))
            || non_empty(env, "RENDER").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let secure_cookies = match non_empty(env, "SESSION_COOKIE_SECURE") {
            Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            None => production,
        };

        Ok(Self {
            database_url: non_empty(env, "DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr,
            idle_minutes: positive_number(env, "IDLE_MINUTES")?.unwrap_or(defaults.idle_minutes as u64) as i64,
            max_services_for_streak: positive_number(env, "MAX_SERVICES_FOR_STREAK")?
                .map(|n| n as usize)
                .unwrap_or(defaults.max_services_for_streak),
            system_username: non_empty(env, "SYSTEM_USER").unwrap_or(defaults.system_username),
            secure_cookies,
            cors_origin: non_empty(env, "CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::minutes(self.idle_minutes)
    }

    /// How long the session store keeps an untouched session. Always longer
    /// than [`Self::idle_threshold`].
    pub fn session_retention(&self) -> time::Duration {
        time::Duration::minutes(self.idle_minutes.max(1) * SESSION_RETENTION_FACTOR)
    }
}

/// Credentials for the account created by `bootstrap-root`
#[derive(Debug, Clone, PartialEq)]
pub struct RootAccountConfig {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl RootAccountConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_provider(&SystemEnvironment)
    }

    pub fn from_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        Ok(Self {
            username: non_empty(env, "ROOT_ADMIN_USER").unwrap_or_else(|| "root".to_string()),
            password: non_empty(env, "ROOT_ADMIN_PASS").ok_or(ConfigError::Missing("ROOT_ADMIN_PASS"))?,
            role: non_empty(env, "ROOT_ADMIN_ROLE").unwrap_or_else(|| "ROOT".to_string()),
        })
    }
}

fn non_empty(env: &dyn EnvironmentProvider, key: &str) -> Option<String> {
    env.get_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive_number(env: &dyn EnvironmentProvider, key: &'static str) -> Result<Option<u64>, ConfigError> {
    match non_empty(env, key) {
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber { key, value }),
        },
        None => Ok(None),
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_SEARCH_COOLDOWN_SECS, DEFAULT_SEARCH_FAILURE_THRESHOLD, DEFAULT_SEARCH_TIMEOUT_SECS,
    DEFAULT_STEP_TIMEOUT_SECS,
};
use crate::errors::BotError;
use super::validation::Validator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram_bot_token: String,

    // User Authorization
    pub allowed_users: Vec<String>,

    // Logging
    pub log_format: LogFormat,

    // Mock backend behaviour
    pub simulate_latency: bool,

    // Coin search guard
    pub search_timeout_secs: u64,
    pub search_failure_threshold: u32,
    pub search_cooldown_secs: u64,

    // Wizard execution
    pub step_timeout_secs: u64,
    pub drop_pending_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| BotError::config("TELEGRAM_BOT_TOKEN not set"))?,

            allowed_users: env::var("ALLOWED_USERS")
                .unwrap_or_else(|_| String::new())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),

            log_format: Self::parse_log_format(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),

            simulate_latency: env::var("SIMULATE_LATENCY")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),

            search_timeout_secs: env::var("COIN_SEARCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_SEARCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS),
            search_failure_threshold: env::var("SEARCH_FAILURE_THRESHOLD")
                .unwrap_or_else(|_| DEFAULT_SEARCH_FAILURE_THRESHOLD.to_string())
                .parse()
                .unwrap_or(DEFAULT_SEARCH_FAILURE_THRESHOLD),
            search_cooldown_secs: env::var("SEARCH_COOLDOWN_SECS")
                .unwrap_or_else(|_| DEFAULT_SEARCH_COOLDOWN_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_SEARCH_COOLDOWN_SECS),

            step_timeout_secs: env::var("STEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_STEP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_STEP_TIMEOUT_SECS),
            drop_pending_updates: env::var("DROP_PENDING_UPDATES")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }

    /// Settings for local runs and tests: no token, no artificial latency.
    pub fn for_local(token: impl Into<String>) -> Self {
        Self {
            telegram_bot_token: token.into(),
            allowed_users: Vec::new(),
            log_format: LogFormat::Pretty,
            simulate_latency: false,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            search_failure_threshold: DEFAULT_SEARCH_FAILURE_THRESHOLD,
            search_cooldown_secs: DEFAULT_SEARCH_COOLDOWN_SECS,
            step_timeout_secs: DEFAULT_STEP_TIMEOUT_SECS,
            drop_pending_updates: true,
        }
    }

    fn parse_log_format(format: &str) -> LogFormat {
        match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn is_user_allowed(&self, user_id: &str) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.iter().any(|u| u == user_id)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn search_cooldown(&self) -> Duration {
        Duration::from_secs(self.search_cooldown_secs)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram_bot_token.is_empty() {
            return Err(BotError::config("Telegram bot token is required").into());
        }

        if self.search_timeout_secs == 0 || self.step_timeout_secs == 0 {
            return Err(BotError::config("Timeouts must be greater than zero").into());
        }

        for user_id in &self.allowed_users {
            Validator::validate_user_id(user_id)?;
        }

        if self.search_failure_threshold == 0 {
            return Err(BotError::config("Search failure threshold must be at least 1").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config_is_valid() {
        let config = Config::for_local("123:abc");
        assert!(config.validate().is_ok());
        assert_eq!(config.search_timeout(), Duration::from_secs(5));
        assert_eq!(config.search_cooldown(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::for_local("");
        assert!(config.validate().is_err());

        config.telegram_bot_token = "123:abc".into();
        config.search_failure_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_allow_list() {
        let mut config = Config::for_local("123:abc");
        assert!(config.is_user_allowed("42"));

        config.allowed_users = vec!["7".into(), "8".into()];
        assert!(config.is_user_allowed("7"));
        assert!(!config.is_user_allowed("42"));
        assert!(config.validate().is_ok());

        config.allowed_users.push("@someone".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(Config::parse_log_format("JSON"), LogFormat::Json);
        assert_eq!(Config::parse_log_format("anything"), LogFormat::Pretty);
    }
}

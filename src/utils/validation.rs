use regex::Regex;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{MAX_ALERT_MESSAGE_LEN, MAX_SEARCH_QUERY_LEN};
use crate::errors::{BotError, Result};

// Accepts "50000", "50,000.5", "$ 1,000", "-2.5" and "12%"
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(-?[0-9][0-9,]*(?:\.[0-9]+)?|-?\.[0-9]+)\s*%?$")
        .expect("number pattern is a valid regex")
});

pub struct Validator;

impl Validator {
    /// Parse a user typed alert threshold.
    pub fn parse_threshold(input: &str) -> Result<Decimal> {
        let trimmed = input.trim();
        let captures = NUMBER_PATTERN
            .captures(trimmed)
            .ok_or_else(|| BotError::validation("Please enter a valid number"))?;

        let digits = captures[1].replace(',', "");
        Decimal::from_str(&digits).map_err(|_| BotError::validation("Please enter a valid number"))
    }

    /// Validate the optional text attached to an alert.
    pub fn validate_alert_message(input: &str) -> Result<String> {
        let message = input.trim();

        if message.is_empty() {
            return Err(BotError::validation("Alert message cannot be empty"));
        }

        if message.chars().count() > MAX_ALERT_MESSAGE_LEN {
            return Err(BotError::validation(format!(
                "Alert message must be at most {} characters",
                MAX_ALERT_MESSAGE_LEN
            )));
        }

        Ok(message.to_string())
    }

    /// Clean a coin search query.
    pub fn sanitize_search_query(input: &str) -> Cow<str> {
        let needs_sanitization = input.chars().count() > MAX_SEARCH_QUERY_LEN
            || input
                .chars()
                .any(|c| !(c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '.'));

        if !needs_sanitization {
            return Cow::Borrowed(input.trim());
        }

        let sanitized: String = input
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '.')
            .take(MAX_SEARCH_QUERY_LEN)
            .collect();

        Cow::Owned(sanitized.trim().to_string())
    }

    /// Validate user ID format
    pub fn validate_user_id(user_id: &str) -> Result<()> {
        if user_id.is_empty() {
            return Err(BotError::validation("User ID cannot be empty"));
        }

        if user_id.len() > 20 {
            return Err(BotError::validation("User ID too long"));
        }

        // Telegram ids are numeric, group chats are negative
        let digits = user_id.strip_prefix('-').unwrap_or(user_id);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(BotError::validation("Invalid user ID format"));
        }

        Ok(())
    }
}

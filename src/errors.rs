use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

/// Top-level error for everything the bot does on behalf of a user.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{kind} limit of {limit} reached")]
    LimitExceeded { kind: String, limit: usize },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Text that is safe to show in the chat.
    pub fn user_message(&self) -> String {
        match self {
            BotError::ValidationError(message) => message.clone(),
            BotError::NotFound(what) => format!("{} not found.", what),
            BotError::LimitExceeded { kind, limit } => {
                format!("You have reached the limit of {} {} alerts.", limit, kind)
            }
            BotError::Search(e) => e.user_message().to_string(),
            _ => "An error occurred. Please try again later.".to_string(),
        }
    }
}

/// Failures of the coin search guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("search timed out")]
    Timeout,

    #[error("search circuit is open")]
    CircuitOpen,

    #[error("search failed: {0}")]
    Upstream(String),
}

impl SearchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::EmptyQuery => "Please enter a coin name or symbol.",
            SearchError::CircuitOpen => {
                "The search service is temporarily unavailable due to repeated errors. Please try again later."
            }
            SearchError::Timeout | SearchError::Upstream(_) => {
                "An error occurred while searching. Please try again later."
            }
        }
    }
}

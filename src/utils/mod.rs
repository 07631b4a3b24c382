mod config;
mod validation;
pub mod formatting;
pub mod timeout;

pub use config::{Config, LogFormat};
pub use validation::Validator;
pub use formatting::{
    bold, escape_markdown, format_compact, format_percentage, format_usd,
    truncate_string,
};
pub use timeout::{is_timeout, with_timeout, OperationTimeout};

pub mod bot;
pub mod components;
pub mod constants;
pub mod errors;
pub mod middleware;
pub mod observability;
pub mod services;
pub mod utils;
pub mod wizards;

pub use errors::{BotError, Result};

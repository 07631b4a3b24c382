mod commands;
mod context;
mod session;
mod telegram;
pub mod handlers;

pub use commands::Command;
pub use context::BotContext;
pub use session::SessionStore;
pub use telegram::TelegramBot;

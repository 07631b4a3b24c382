use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::picker::go_back_button;
use super::screen::Screen;

pub const DEFAULT_CONFIRM_LABEL: &str = "Confirm";
pub const DEFAULT_CONFIRM_DATA: &str = "confirmation_confirm";

/// Confirm / go back prompt.
pub fn confirmation(message: impl Into<String>, confirm_label: &str, confirm_data: &str) -> Screen {
    Screen::new(
        message,
        InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback(confirm_label, confirm_data),
            go_back_button(),
        ]]),
    )
}

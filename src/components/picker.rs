use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::constants::{GO_BACK, GO_BACK_LABEL};

pub fn go_back_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(GO_BACK_LABEL, GO_BACK)
}

pub fn go_back_row() -> Vec<InlineKeyboardButton> {
    vec![go_back_button()]
}

/// Buttons per row for a set of labels, judged by the longest one.
pub fn buttons_per_row<S: AsRef<str>>(labels: &[S]) -> usize {
    let longest = labels
        .iter()
        .map(|l| l.as_ref().chars().count())
        .max()
        .unwrap_or(0);

    match longest {
        n if n > 10 => 1,
        n if n > 6 => 2,
        _ => 3,
    }
}

/// Lay buttons out in rows sized by [`buttons_per_row`].
pub fn auto_layout(buttons: Vec<InlineKeyboardButton>) -> Vec<Vec<InlineKeyboardButton>> {
    let per_row = buttons_per_row(&buttons.iter().map(|b| b.text.as_str()).collect::<Vec<_>>());
    buttons.chunks(per_row).map(|row| row.to_vec()).collect()
}

/// Single choice keyboard. Each option is `(label, value)` and sends `{prefix}_{value}`.
pub fn picker<L, V>(prefix: &str, options: &[(L, V)]) -> InlineKeyboardMarkup
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    let buttons = options
        .iter()
        .map(|(label, value)| {
            InlineKeyboardButton::callback(
                label.as_ref().to_string(),
                format!("{}_{}", prefix, value.as_ref()),
            )
        })
        .collect();

    let mut rows = auto_layout(buttons);
    rows.push(go_back_row());
    InlineKeyboardMarkup::new(rows)
}

/// Value of a picker callback, if it belongs to `prefix`.
pub fn parse_choice<'a>(prefix: &str, data: &'a str) -> Option<&'a str> {
    data.strip_prefix(prefix)?
        .strip_prefix('_')
        .filter(|value| !value.is_empty())
}

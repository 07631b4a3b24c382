use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::debug;

use crate::constants::GO_BACK;
use super::picker::buttons_per_row;

/// Selected options in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiPickerState {
    pub selected: Vec<String>,
}

impl MultiPickerState {
    pub fn is_selected(&self, option: &str) -> bool {
        self.selected.iter().any(|s| s == option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPickerOutcome {
    pub state: MultiPickerState,
    /// The user confirmed a non-empty selection.
    pub proceed: bool,
    /// The keyboard changed and should be drawn again.
    pub redraw: bool,
    pub notice: Option<String>,
}

/// Bounded multiple choice keyboard.
#[derive(Debug, Clone, Copy)]
pub struct MultiPicker<'a> {
    pub prefix: &'a str,
    pub limit: usize,
}

impl<'a> MultiPicker<'a> {
    pub fn new(prefix: &'a str, limit: usize) -> Self {
        Self { prefix, limit }
    }

    pub fn choose_data(&self) -> String {
        format!("{}_CHOOSE", self.prefix)
    }

    pub fn render<S: AsRef<str>>(&self, state: &MultiPickerState, options: &[S]) -> InlineKeyboardMarkup {
        let per_row = buttons_per_row(options);

        let mut rows: Vec<Vec<InlineKeyboardButton>> = options
            .chunks(per_row)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|option| {
                        let option = option.as_ref();
                        let label = if state.is_selected(option) {
                            format!("✅ {}", option)
                        } else {
                            option.to_string()
                        };
                        InlineKeyboardButton::callback(label, format!("{}_option_{}", self.prefix, option))
                    })
                    .collect()
            })
            .collect();

        rows.push(vec![
            InlineKeyboardButton::callback("← Back", GO_BACK),
            InlineKeyboardButton::callback("Next →", self.choose_data()),
        ]);
        InlineKeyboardMarkup::new(rows)
    }

    /// Apply a callback. Returns `None` when the data is not addressed to this picker.
    pub fn handle(&self, data: &str, state: &MultiPickerState) -> Option<MultiPickerOutcome> {
        let rest = data.strip_prefix(self.prefix)?.strip_prefix('_')?;

        if rest == "CHOOSE" {
            if state.selected.is_empty() {
                return Some(MultiPickerOutcome {
                    state: state.clone(),
                    proceed: false,
                    redraw: false,
                    notice: Some("Please select at least one option".into()),
                });
            }

            debug!("Proceeding with selections: {}", state.selected.join(", "));
            return Some(MultiPickerOutcome {
                state: state.clone(),
                proceed: true,
                redraw: true,
                notice: Some(format!("Selection confirmed: {}", state.selected.join(", "))),
            });
        }

        let option = rest.strip_prefix("option_").filter(|o| !o.is_empty())?;
        let mut next = state.clone();

        if let Some(index) = next.selected.iter().position(|s| s == option) {
            next.selected.remove(index);
            return Some(MultiPickerOutcome {
                state: next,
                proceed: false,
                redraw: true,
                notice: Some(format!("Deselected: {}", option)),
            });
        }

        if next.selected.len() >= self.limit {
            debug!("Selection limit reached ({})", self.limit);
            return Some(MultiPickerOutcome {
                state: state.clone(),
                proceed: false,
                redraw: false,
                notice: Some(format!("Maximum {} options allowed", self.limit)),
            });
        }

        next.selected.push(option.to_string());
        Some(MultiPickerOutcome {
            state: next,
            proceed: false,
            redraw: true,
            notice: Some(format!("Selected: {}", option)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: [&str; 4] = ["RSI", "MACD", "Stochastic", "Moving Average"];

    fn picker() -> MultiPicker<'static> {
        MultiPicker::new("indicator_picker", 3)
    }

    fn select(state: &MultiPickerState, option: &str) -> MultiPickerOutcome {
        picker()
            .handle(&format!("indicator_picker_option_{}", option), state)
            .unwrap()
    }

    #[test]
    fn test_selection_beyond_limit_is_rejected() {
        let mut state = MultiPickerState::default();
        for option in &OPTIONS[..3] {
            state = select(&state, option).state;
        }

        let outcome = select(&state, OPTIONS[3]);
        assert_eq!(outcome.state, state);
        assert!(!outcome.proceed);
        assert!(!outcome.redraw);
        assert_eq!(outcome.notice.as_deref(), Some("Maximum 3 options allowed"));
    }

    #[test]
    fn test_toggle_restores_original_state() {
        let original = MultiPickerState { selected: vec!["RSI".into()] };
        let once = select(&original, "MACD").state;
        let twice = select(&once, "MACD").state;
        assert_eq!(twice, original);
    }

    #[test]
    fn test_choose_requires_selection() {
        let empty = MultiPickerState::default();
        let outcome = picker().handle("indicator_picker_CHOOSE", &empty).unwrap();
        assert!(!outcome.proceed);
        assert_eq!(outcome.notice.as_deref(), Some("Please select at least one option"));

        let state = select(&empty, "RSI").state;
        assert!(picker().handle("indicator_picker_CHOOSE", &state).unwrap().proceed);
    }

    #[test]
    fn test_foreign_data_is_ignored() {
        assert!(picker().handle("multipicker_option_RSI", &MultiPickerState::default()).is_none());
        assert!(picker().handle("go_back", &MultiPickerState::default()).is_none());
    }

    #[test]
    fn test_render_marks_selection() {
        let state = MultiPickerState { selected: vec!["MACD".into()] };
        let keyboard = picker().render(&state, &OPTIONS);
        let rows = &keyboard.inline_keyboard;

        assert_eq!(rows[1][0].text, "✅ MACD");
        let nav = rows.last().unwrap();
        assert_eq!(nav[0].text, "← Back");
        assert_eq!(nav[1].text, "Next →");
    }
}

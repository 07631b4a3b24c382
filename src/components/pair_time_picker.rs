use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::constants::GO_BACK;
use crate::services::types::{Pairing, TimeFrame};

const PAIRINGS: [Pairing; 3] = [Pairing::Usd, Pairing::Btc, Pairing::Eth];
const TIMEFRAME_ROWS: [&[TimeFrame]; 2] = [
    &[TimeFrame::H1, TimeFrame::H4, TimeFrame::H6, TimeFrame::H12],
    &[TimeFrame::D1, TimeFrame::W1, TimeFrame::M1],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairTimeState {
    pub pairing: Pairing,
    pub timeframe: TimeFrame,
}

impl Default for PairTimeState {
    fn default() -> Self {
        Self {
            pairing: Pairing::Usd,
            timeframe: TimeFrame::D1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairTimeOutcome {
    pub state: PairTimeState,
    pub proceed: bool,
}

/// Combined pairing and timeframe keyboard.
pub struct PairTimePicker<'a> {
    pub prefix: &'a str,
}

impl<'a> PairTimePicker<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    fn mark(label: &str, selected: bool) -> String {
        if selected {
            format!("✅ {}", label)
        } else {
            label.to_string()
        }
    }

    pub fn render(&self, state: &PairTimeState) -> InlineKeyboardMarkup {
        let mut rows = vec![PAIRINGS
            .iter()
            .map(|p| {
                InlineKeyboardButton::callback(
                    Self::mark(p.as_str(), *p == state.pairing),
                    format!("{}_pair_{}", self.prefix, p.as_str()),
                )
            })
            .collect::<Vec<_>>()];

        for timeframes in TIMEFRAME_ROWS {
            rows.push(
                timeframes
                    .iter()
                    .map(|t| {
                        InlineKeyboardButton::callback(
                            Self::mark(t.label(), *t == state.timeframe),
                            format!("{}_time_{}", self.prefix, t.as_str()),
                        )
                    })
                    .collect(),
            );
        }

        rows.push(vec![
            InlineKeyboardButton::callback("← Back", GO_BACK),
            InlineKeyboardButton::callback("Next →", format!("{}_CHOOSE", self.prefix)),
        ]);
        InlineKeyboardMarkup::new(rows)
    }

    /// Apply a callback. Unknown tokens under this prefix leave the state untouched.
    pub fn handle(&self, data: &str, state: &PairTimeState) -> Option<PairTimeOutcome> {
        let rest = data.strip_prefix(self.prefix)?.strip_prefix('_')?;
        let mut next = *state;

        if rest == "CHOOSE" {
            return Some(PairTimeOutcome { state: next, proceed: true });
        }

        if let Some(pairing) = rest.strip_prefix("pair_") {
            if let Ok(pairing) = pairing.parse() {
                next.pairing = pairing;
            }
        } else if let Some(timeframe) = rest.strip_prefix("time_") {
            if let Ok(timeframe) = timeframe.parse() {
                next.timeframe = timeframe;
            }
        }

        Some(PairTimeOutcome { state: next, proceed: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_marked() {
        let keyboard = PairTimePicker::new("cmbpicker").render(&PairTimeState::default());
        let rows = &keyboard.inline_keyboard;

        assert_eq!(rows[0][0].text, "✅ USD");
        assert_eq!(rows[2][0].text, "✅ 1D");
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_handle_updates_state() {
        let picker = PairTimePicker::new("cmbpicker");
        let state = PairTimeState::default();

        let outcome = picker.handle("cmbpicker_pair_BTC", &state).unwrap();
        assert_eq!(outcome.state.pairing, Pairing::Btc);
        assert!(!outcome.proceed);

        let outcome = picker.handle("cmbpicker_time_H4", &outcome.state).unwrap();
        assert_eq!(outcome.state.timeframe, TimeFrame::H4);

        let outcome = picker.handle("cmbpicker_time_bogus", &outcome.state).unwrap();
        assert_eq!(outcome.state.timeframe, TimeFrame::H4);

        assert!(picker.handle("cmbpicker_CHOOSE", &state).unwrap().proceed);
        assert!(picker.handle("strengthpicker_CHOOSE", &state).is_none());
    }
}

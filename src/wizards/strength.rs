use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::handlers::menu::Menu;
use crate::components::{go_back_row, PairTimePicker, PairTimeState, Reply, Screen};
use crate::constants::MAX_CHARTS_PER_BATCH;
use crate::errors::Result;
use crate::services::types::{DiscoveryFeature, DiscoveryQuery, StrengthType};
use crate::utils::{bold, escape_markdown};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const PICKER_PREFIX: &str = "strengthpicker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthStep {
    Type,
    PairTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrengthParams {
    pub strength: Option<StrengthType>,
    pub pair_time: PairTimeState,
}

const STEPS: &[StepDecl<StrengthStep, StrengthParams>] = &[
    StepDecl { step: StrengthStep::Type, when: always },
    StepDecl { step: StrengthStep::PairTime, when: always },
];

/// Strongest or weakest performers, rendered as a chart batch.
pub struct StrengthWizard;

impl StrengthWizard {
    fn follow_up() -> Screen {
        Screen::new(
            escape_markdown("What would you like to do next?"),
            InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback("🔄 New Search", "strength_wizard"),
                InlineKeyboardButton::callback("🔎 Back to Discover", "discover_submenu"),
            ]]),
        )
    }

    async fn results(strength: StrengthType, pair_time: PairTimeState, ctx: &StepContext) -> Result<Vec<Reply>> {
        let page = ctx
            .services
            .discovery
            .discover(&DiscoveryQuery {
                feature: DiscoveryFeature::Strength(strength),
                pairing: pair_time.pairing,
                timeframe: pair_time.timeframe,
                page: 1,
                limit: MAX_CHARTS_PER_BATCH,
            })
            .await?;

        if page.coins.is_empty() {
            return Ok(vec![
                Reply::notice("No coins found for this selection."),
                Self::follow_up().into(),
            ]);
        }

        let header = format!(
            "🏆 {}\n{}",
            bold(strength.title()),
            escape_markdown(&format!(
                "Pair: {} | TF: {}",
                pair_time.pairing,
                pair_time.timeframe.label()
            ))
        );

        let mut replies = vec![Screen::plain(header).into()];
        replies.extend(
            ctx.services
                .charts
                .discovery_batch(&page.coins, pair_time.pairing, pair_time.timeframe, Some(strength.title()))
                .await,
        );
        replies.push(Self::follow_up().into());
        Ok(replies)
    }
}

#[async_trait]
impl Flow for StrengthWizard {
    type Step = StrengthStep;
    type Params = StrengthParams;

    fn name(&self) -> &'static str {
        "strength"
    }

    fn steps(&self) -> &[StepDecl<StrengthStep, StrengthParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Discover
    }

    fn clear(&self, step: StrengthStep, params: &mut StrengthParams) {
        match step {
            StrengthStep::Type => params.strength = None,
            StrengthStep::PairTime => params.pair_time = PairTimeState::default(),
        }
    }

    async fn render(&self, step: StrengthStep, params: &mut StrengthParams, _ctx: &StepContext) -> Result<Vec<Reply>> {
        let screen = match step {
            StrengthStep::Type => Screen::new(
                format!(
                    "🏆 {}\n\n{}",
                    bold("Strength Analysis"),
                    escape_markdown("Which coins do you want to see?")
                ),
                InlineKeyboardMarkup::new(vec![
                    vec![
                        InlineKeyboardButton::callback("💪 Strongest", "strength_type_strongest"),
                        InlineKeyboardButton::callback("📉 Weakest", "strength_type_weakest"),
                    ],
                    go_back_row(),
                ]),
            ),
            StrengthStep::PairTime => Screen::new(
                format!(
                    "🏆 {}\n\n{}",
                    bold(params.strength.map_or("Strength Analysis", |s| s.title())),
                    escape_markdown("Select pairing and timeframe:")
                ),
                PairTimePicker::new(PICKER_PREFIX).render(&params.pair_time),
            ),
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: StrengthStep,
        input: Input<'_>,
        params: &mut StrengthParams,
        ctx: &StepContext,
    ) -> Result<Outcome<StrengthStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };

        match step {
            StrengthStep::Type => {
                let strength = match data {
                    "strength_type_strongest" => StrengthType::Strongest,
                    "strength_type_weakest" => StrengthType::Weakest,
                    _ => return Ok(Outcome::toast("Please choose strongest or weakest.")),
                };
                params.strength = Some(strength);
                Ok(Outcome::next())
            }
            StrengthStep::PairTime => {
                let Some(outcome) = PairTimePicker::new(PICKER_PREFIX).handle(data, &params.pair_time) else {
                    return Ok(Outcome::toast("Please use the buttons above."));
                };
                params.pair_time = outcome.state;
                if !outcome.proceed {
                    return Ok(Outcome::redraw());
                }
                let Some(strength) = params.strength else {
                    return Ok(Outcome::goto(StrengthStep::Type));
                };
                let replies = Self::results(strength, params.pair_time, ctx).await?;
                Ok(Outcome::done().replies(replies))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Services;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_send_charts_then_follow_up() {
        let ctx = StepContext::new(Arc::new(Services::in_memory()), "7", Duration::from_secs(20));
        let replies = StrengthWizard::results(StrengthType::Strongest, PairTimeState::default(), &ctx)
            .await
            .unwrap();

        assert_eq!(replies.len(), MAX_CHARTS_PER_BATCH + 2);
        assert!(matches!(replies[1], Reply::Photo { .. }));
        let last = replies.last().and_then(Reply::as_screen).unwrap();
        assert_eq!(last.callback_data(), vec!["strength_wizard", "discover_submenu"]);
    }
}

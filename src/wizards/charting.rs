use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{PairTimePicker, PairTimeState, Reply, Screen};
use crate::constants::MAIN_MENU;
use crate::errors::Result;
use crate::services::types::Coin;
use crate::utils::{bold, escape_markdown};
use super::coin_steps::{self, CoinSelection};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const PICKER_PREFIX: &str = "cmbpicker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStep {
    CoinSearch,
    CoinResults,
    PairTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartParams {
    /// Coin came with the entry button, no search needed.
    pub preset: bool,
    pub coin: CoinSelection,
    pub pair_time: PairTimeState,
}

impl ChartParams {
    pub fn for_coin(coin: Coin) -> Self {
        Self {
            preset: true,
            coin: CoinSelection::preset(coin),
            pair_time: PairTimeState::default(),
        }
    }
}

fn needs_search(p: &ChartParams) -> bool {
    !p.preset
}

fn shows_results(p: &ChartParams) -> bool {
    p.coin.shows_results()
}

const STEPS: &[StepDecl<ChartStep, ChartParams>] = &[
    StepDecl { step: ChartStep::CoinSearch, when: needs_search },
    StepDecl { step: ChartStep::CoinResults, when: shows_results },
    StepDecl { step: ChartStep::PairTime, when: always },
];

/// Pick a coin, a pairing and a timeframe, get a chart.
pub struct ChartingWizard;

impl ChartingWizard {
    fn chart_actions(coin_id: &str) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(vec![
            vec![
                InlineKeyboardButton::callback("📈 New Chart", "charting_wizard"),
                InlineKeyboardButton::callback("⭐ Add to Watchlist", format!("watchlist_add_{}", coin_id)),
            ],
            vec![InlineKeyboardButton::callback("🏠 Main Menu", MAIN_MENU)],
        ])
    }
}

#[async_trait]
impl Flow for ChartingWizard {
    type Step = ChartStep;
    type Params = ChartParams;

    fn name(&self) -> &'static str {
        "charting"
    }

    fn steps(&self) -> &[StepDecl<ChartStep, ChartParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Main
    }

    fn clear(&self, step: ChartStep, params: &mut ChartParams) {
        match step {
            ChartStep::CoinSearch => params.coin.clear(),
            ChartStep::CoinResults => params.coin.coin = None,
            ChartStep::PairTime => params.pair_time = PairTimeState::default(),
        }
    }

    async fn render(&self, step: ChartStep, params: &mut ChartParams, _ctx: &StepContext) -> Result<Vec<Reply>> {
        Ok(match step {
            ChartStep::CoinSearch => coin_steps::render_search("Chart a Coin"),
            ChartStep::CoinResults => coin_steps::render_results(&params.coin),
            ChartStep::PairTime => vec![Screen::new(
                format!(
                    "📈 {}\n\n{}",
                    bold(params.coin.coin_name()),
                    escape_markdown("Select pairing and timeframe, then press Next:")
                ),
                PairTimePicker::new(PICKER_PREFIX).render(&params.pair_time),
            )
            .into()],
        })
    }

    async fn handle(
        &self,
        step: ChartStep,
        input: Input<'_>,
        params: &mut ChartParams,
        ctx: &StepContext,
    ) -> Result<Outcome<ChartStep>> {
        match step {
            ChartStep::CoinSearch => coin_steps::handle_search(input, &mut params.coin, ctx).await,
            ChartStep::CoinResults => coin_steps::handle_results(input, &mut params.coin, ctx).await,
            ChartStep::PairTime => {
                let Input::Callback(data) = input else {
                    return Ok(Outcome::toast("Please use the buttons above."));
                };
                let Some(outcome) = PairTimePicker::new(PICKER_PREFIX).handle(data, &params.pair_time) else {
                    return Ok(Outcome::toast("Please use the buttons above."));
                };
                params.pair_time = outcome.state;
                if !outcome.proceed {
                    return Ok(Outcome::redraw());
                }

                let Some(coin) = params.coin.coin.as_ref() else {
                    return Ok(Outcome::leave().reply(Reply::notice("Please select a coin first.")));
                };
                let PairTimeState { pairing, timeframe } = params.pair_time;
                info!("Charting {} {} {}", coin.id, pairing, timeframe.label());

                let png = ctx.services.charts.generate_chart(&coin.name, pairing, timeframe).await?;
                let caption = format!(
                    "📈 {}\n{}",
                    bold(&format!("{} ({})", coin.name, coin.symbol)),
                    escape_markdown(&format!("Pair: {} | TF: {}", pairing, timeframe.label()))
                );
                Ok(Outcome::done().reply(Reply::Photo {
                    png,
                    caption,
                    keyboard: Some(Self::chart_actions(&coin.id)),
                }))
            }
        }
    }
}

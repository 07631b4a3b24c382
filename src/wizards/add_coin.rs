use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{auto_layout, go_back_row, parse_choice, Reply, Screen};
use crate::errors::Result;
use crate::services::types::Coin;
use crate::utils::{bold, escape_markdown};
use super::coin_steps::{self, CoinSelection};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const NEW_WATCHLIST: &str = "new";
const DEFAULT_WATCHLIST_NAME: &str = "My Watchlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCoinStep {
    CoinSearch,
    CoinResults,
    Watchlist,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddCoinParams {
    pub preset: bool,
    pub coin: CoinSelection,
}

impl AddCoinParams {
    pub fn for_coin(coin: Coin) -> Self {
        Self {
            preset: true,
            coin: CoinSelection::preset(coin),
        }
    }
}

fn needs_search(p: &AddCoinParams) -> bool {
    !p.preset
}

fn shows_results(p: &AddCoinParams) -> bool {
    p.coin.shows_results()
}

const STEPS: &[StepDecl<AddCoinStep, AddCoinParams>] = &[
    StepDecl { step: AddCoinStep::CoinSearch, when: needs_search },
    StepDecl { step: AddCoinStep::CoinResults, when: shows_results },
    StepDecl { step: AddCoinStep::Watchlist, when: always },
];

/// Add a coin to one of the user's watchlists.
pub struct AddCoinWizard;

#[async_trait]
impl Flow for AddCoinWizard {
    type Step = AddCoinStep;
    type Params = AddCoinParams;

    fn name(&self) -> &'static str {
        "add_coin"
    }

    fn steps(&self) -> &[StepDecl<AddCoinStep, AddCoinParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Watchlists
    }

    fn clear(&self, step: AddCoinStep, params: &mut AddCoinParams) {
        match step {
            AddCoinStep::CoinSearch => params.coin.clear(),
            AddCoinStep::CoinResults => params.coin.coin = None,
            AddCoinStep::Watchlist => {}
        }
    }

    async fn render(&self, step: AddCoinStep, params: &mut AddCoinParams, ctx: &StepContext) -> Result<Vec<Reply>> {
        Ok(match step {
            AddCoinStep::CoinSearch => coin_steps::render_search("Add Coin to Watchlist"),
            AddCoinStep::CoinResults => coin_steps::render_results(&params.coin),
            AddCoinStep::Watchlist => {
                let watchlists = ctx.services.watchlists.get_watchlists(&ctx.user_id, false).await;
                let buttons = watchlists
                    .iter()
                    .map(|w| InlineKeyboardButton::callback(w.name.clone(), format!("add_to_watchlist_{}", w.id)))
                    .collect();
                let mut rows = auto_layout(buttons);
                rows.push(vec![InlineKeyboardButton::callback(
                    "➕ New Watchlist",
                    format!("add_to_watchlist_{}", NEW_WATCHLIST),
                )]);
                rows.push(go_back_row());

                vec![Screen::new(
                    format!(
                        "⭐ {}\n\n{}",
                        bold(&format!("Add {}", params.coin.coin_name())),
                        escape_markdown("Choose the watchlist to add it to:")
                    ),
                    InlineKeyboardMarkup::new(rows),
                )
                .into()]
            }
        })
    }

    async fn handle(
        &self,
        step: AddCoinStep,
        input: Input<'_>,
        params: &mut AddCoinParams,
        ctx: &StepContext,
    ) -> Result<Outcome<AddCoinStep>> {
        match step {
            AddCoinStep::CoinSearch => coin_steps::handle_search(input, &mut params.coin, ctx).await,
            AddCoinStep::CoinResults => coin_steps::handle_results(input, &mut params.coin, ctx).await,
            AddCoinStep::Watchlist => {
                let Some(target) = (match input {
                    Input::Callback(data) => parse_choice("add_to_watchlist", data),
                    Input::Text(_) => None,
                }) else {
                    return Ok(Outcome::toast("Please choose a watchlist."));
                };
                let Some(coin) = params.coin.coin.as_ref() else {
                    return Ok(Outcome::leave().reply(Reply::notice("Please select a coin first.")));
                };

                let watchlists = &ctx.services.watchlists;
                let watchlist_id = if target == NEW_WATCHLIST {
                    watchlists
                        .create_watchlist(&ctx.user_id, false, DEFAULT_WATCHLIST_NAME)
                        .await?
                        .id
                } else {
                    match watchlists.get_watchlist_by_id(target).await {
                        Some(w) if w.telegram_id == ctx.user_id => w.id,
                        _ => return Ok(Outcome::redraw().reply(Reply::notice("Watchlist not found."))),
                    }
                };

                let watchlist = watchlists.add_coin(&watchlist_id, &coin.id).await?;
                info!("User {} added {} to {}", ctx.user_id, coin.id, watchlist.id);
                Ok(Outcome::leave().reply(Reply::toast(format!("Added {} to {}", coin.name, watchlist.name))))
            }
        }
    }
}

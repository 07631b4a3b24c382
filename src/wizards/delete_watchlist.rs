use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{confirmation, go_back_row, parse_choice, Reply, Screen};
use crate::errors::Result;
use crate::services::types::Watchlist;
use crate::utils::{bold, escape_markdown};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const CONFIRM_DATA: &str = "delete_watchlist_confirm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteWatchlistStep {
    Select,
    Confirm,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteWatchlistParams {
    pub watchlist: Option<Watchlist>,
}

const STEPS: &[StepDecl<DeleteWatchlistStep, DeleteWatchlistParams>] = &[
    StepDecl { step: DeleteWatchlistStep::Select, when: always },
    StepDecl { step: DeleteWatchlistStep::Confirm, when: always },
];

pub struct DeleteWatchlistWizard;

#[async_trait]
impl Flow for DeleteWatchlistWizard {
    type Step = DeleteWatchlistStep;
    type Params = DeleteWatchlistParams;

    fn name(&self) -> &'static str {
        "delete_watchlist"
    }

    fn steps(&self) -> &[StepDecl<DeleteWatchlistStep, DeleteWatchlistParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Watchlists
    }

    fn clear(&self, step: DeleteWatchlistStep, params: &mut DeleteWatchlistParams) {
        if step == DeleteWatchlistStep::Select {
            params.watchlist = None;
        }
    }

    async fn render(
        &self,
        step: DeleteWatchlistStep,
        params: &mut DeleteWatchlistParams,
        ctx: &StepContext,
    ) -> Result<Vec<Reply>> {
        let screen = match step {
            DeleteWatchlistStep::Select => {
                let watchlists = ctx.services.watchlists.get_watchlists(&ctx.user_id, false).await;
                if watchlists.is_empty() {
                    Screen::new(
                        escape_markdown("You don't have any watchlists to delete."),
                        InlineKeyboardMarkup::new(vec![go_back_row()]),
                    )
                } else {
                    let mut rows: Vec<Vec<InlineKeyboardButton>> = watchlists
                        .iter()
                        .map(|w| {
                            vec![InlineKeyboardButton::callback(
                                format!("{} ({} coins)", w.name, w.coins.len()),
                                format!("select_watchlist_to_delete_{}", w.id),
                            )]
                        })
                        .collect();
                    rows.push(go_back_row());
                    Screen::new(
                        format!(
                            "🗑️ {}\n\n{}",
                            bold("Delete Watchlist"),
                            escape_markdown("Select the watchlist to delete:")
                        ),
                        InlineKeyboardMarkup::new(rows),
                    )
                }
            }
            DeleteWatchlistStep::Confirm => {
                let name = params.watchlist.as_ref().map_or("this watchlist", |w| w.name.as_str());
                confirmation(
                    format!(
                        "⚠️ {}\n\n{}",
                        bold(&format!("Delete {}?", name)),
                        escape_markdown("This cannot be undone.")
                    ),
                    "🗑️ Delete",
                    CONFIRM_DATA,
                )
            }
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: DeleteWatchlistStep,
        input: Input<'_>,
        params: &mut DeleteWatchlistParams,
        ctx: &StepContext,
    ) -> Result<Outcome<DeleteWatchlistStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };

        Ok(match step {
            DeleteWatchlistStep::Select => {
                let Some(id) = parse_choice("select_watchlist_to_delete", data) else {
                    return Ok(Outcome::toast("Please pick a watchlist from the list."));
                };
                match ctx.services.watchlists.get_watchlist_by_id(id).await {
                    Some(w) if w.telegram_id == ctx.user_id => {
                        params.watchlist = Some(w);
                        Outcome::next()
                    }
                    _ => Outcome::redraw().reply(Reply::notice("Watchlist not found.")),
                }
            }
            DeleteWatchlistStep::Confirm => {
                if data != CONFIRM_DATA {
                    return Ok(Outcome::toast("Please confirm or go back."));
                }
                let Some(watchlist) = params.watchlist.as_ref() else {
                    return Ok(Outcome::leave());
                };
                if ctx.services.watchlists.delete_watchlist(&ctx.user_id, &watchlist.id).await {
                    info!("User {} deleted watchlist {}", ctx.user_id, watchlist.id);
                    Outcome::leave().reply(Reply::toast(format!("Deleted {}", watchlist.name)))
                } else {
                    Outcome::leave().reply(Reply::notice("Watchlist not found or already deleted."))
                }
            }
        })
    }
}

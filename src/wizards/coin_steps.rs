use crate::components::coin_search::{no_results_screen, parse_action, prompt_screen, results_screen};
use crate::components::{CoinSearchState, Reply, SearchAction, SearchOutcome};
use crate::constants::{COIN_SEARCH_PREFIX, WIZARD_CONFIDENCE_THRESHOLD};
use crate::errors::Result;
use crate::services::types::Coin;
use crate::utils::{bold, escape_markdown};
use super::machine::{Advance, Input, Outcome, StepContext};

/// Coin picked through the search and result steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinSelection {
    /// Present only while a result list is being shown.
    pub search: Option<CoinSearchState>,
    pub coin: Option<Coin>,
}

impl CoinSelection {
    pub fn preset(coin: Coin) -> Self {
        Self { search: None, coin: Some(coin) }
    }

    pub fn shows_results(&self) -> bool {
        self.search.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn coin_name(&self) -> &str {
        self.coin.as_ref().map_or("Unknown Coin", |c| c.name.as_str())
    }
}

pub fn render_search(title: &str) -> Vec<Reply> {
    let text = format!(
        "🔍 {}\n\n{}",
        bold(title),
        escape_markdown("Type the name or symbol of the coin:")
    );
    vec![prompt_screen(&text).into()]
}

pub fn render_results(selection: &CoinSelection) -> Vec<Reply> {
    match &selection.search {
        Some(state) => vec![results_screen(COIN_SEARCH_PREFIX, state).into()],
        None => vec![Reply::notice("No search results to show. Please search again.")],
    }
}

async fn run_search<S>(
    query: &str,
    selection: &mut CoinSelection,
    ctx: &StepContext,
    on_results: Advance<S>,
) -> Outcome<S> {
    match ctx
        .services
        .coin_search
        .process_search(query, WIZARD_CONFIDENCE_THRESHOLD)
        .await
    {
        Ok(SearchOutcome::AutoSelected(coin)) => {
            let found = format!("Found {} ({})", coin.name, coin.symbol);
            selection.search = None;
            selection.coin = Some(coin);
            Outcome::next().reply(Reply::toast(found))
        }
        Ok(SearchOutcome::Results(state)) => {
            selection.search = Some(state);
            selection.coin = None;
            Outcome {
                advance: on_results,
                replies: Vec::new(),
            }
        }
        Ok(SearchOutcome::NoResults(query)) => {
            Outcome::hold().reply(no_results_screen(COIN_SEARCH_PREFIX, &query).into())
        }
        // Search failures re-prompt instead of leaving the wizard
        Err(e) => Outcome::redraw().reply(Reply::notice(e.user_message())),
    }
}

/// Input on the search prompt.
pub async fn handle_search<S>(input: Input<'_>, selection: &mut CoinSelection, ctx: &StepContext) -> Result<Outcome<S>> {
    Ok(match input {
        Input::Text(query) => run_search(query, selection, ctx, Advance::Next).await,
        Input::Callback(data) => match parse_action(COIN_SEARCH_PREFIX, data) {
            Some(SearchAction::Retry) => Outcome::redraw(),
            _ => Outcome::toast("Please type a coin name or symbol."),
        },
    })
}

/// Input on the result list. Typing again starts a new search.
pub async fn handle_results<S>(input: Input<'_>, selection: &mut CoinSelection, ctx: &StepContext) -> Result<Outcome<S>> {
    let data = match input {
        Input::Text(query) => return Ok(run_search(query, selection, ctx, Advance::Redraw).await),
        Input::Callback(data) => data,
    };

    Ok(match parse_action(COIN_SEARCH_PREFIX, data) {
        Some(SearchAction::Select(id)) => {
            match selection.search.as_ref().and_then(|s| s.find(&id)).cloned() {
                Some(coin) => {
                    let toast = format!("Selected {}", coin.name);
                    selection.coin = Some(coin);
                    Outcome::next().reply(Reply::toast(toast))
                }
                None => Outcome::hold().reply(Reply::notice("Could not find the selected coin.")),
            }
        }
        Some(SearchAction::Page(page)) => match selection.search.as_mut() {
            Some(state) => {
                state.page = page.clamp(1, state.page_count());
                Outcome::redraw()
            }
            None => Outcome::hold(),
        },
        // The no-results screen can replace the list; retry drops the old results
        Some(SearchAction::Retry) => {
            selection.search = None;
            Outcome::back()
        }
        None => Outcome::toast("Please pick a coin from the list."),
    })
}

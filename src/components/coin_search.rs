use std::sync::Arc;
use std::time::Duration;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{error, info};

use crate::constants::RESULTS_PER_PAGE;
use crate::errors::SearchError;
use crate::middleware::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use crate::services::coin_search::CoinSearchApi;
use crate::services::types::{Coin, SearchResult};
use crate::utils::{bold, escape_markdown, is_timeout, with_timeout, Validator};
use super::picker::{go_back_button, go_back_row};
use super::screen::Screen;

/// Search results being paged through by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// 1-based.
    pub page: usize,
}

impl CoinSearchState {
    pub fn page_count(&self) -> usize {
        self.results.len().div_ceil(RESULTS_PER_PAGE).max(1)
    }

    pub fn find(&self, coin_id: &str) -> Option<&Coin> {
        self.results.iter().map(|r| &r.coin).find(|c| c.id == coin_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Top result cleared the confidence threshold.
    AutoSelected(Coin),
    Results(CoinSearchState),
    NoResults(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Select(String),
    Page(usize),
    Retry,
}

/// Coin search guarded by a timeout and a circuit breaker.
pub struct CoinSearch {
    api: Arc<dyn CoinSearchApi>,
    breaker: CircuitBreaker,
    timeout: Duration,
}

impl CoinSearch {
    pub fn new(api: Arc<dyn CoinSearchApi>, timeout: Duration, breaker_config: CircuitBreakerConfig) -> Self {
        Self {
            api,
            breaker: CircuitBreaker::new("coin_search", breaker_config),
            timeout,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub async fn get_coin(&self, id: &str) -> crate::errors::Result<Option<Coin>> {
        self.api.get_coin(id).await
    }

    pub async fn process_search(&self, raw_query: &str, threshold: f64) -> Result<SearchOutcome, SearchError> {
        let query = Validator::sanitize_search_query(raw_query).into_owned();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        info!("Processing search query: \"{}\"", query);

        let api = Arc::clone(&self.api);
        let search = async {
            with_timeout(
                async { api.search(&query).await.map_err(anyhow::Error::from) },
                self.timeout,
                "coin_search",
            )
            .await
        };

        let results = match self.breaker.execute(search).await {
            Ok(results) => results,
            Err(CircuitBreakerError::CircuitOpen) => return Err(SearchError::CircuitOpen),
            Err(CircuitBreakerError::OperationFailed(e)) => {
                error!(
                    "Search error: {}. Failure count: {}",
                    e,
                    self.breaker.consecutive_failures()
                );
                return Err(if is_timeout(&e) {
                    SearchError::Timeout
                } else {
                    SearchError::Upstream(e.to_string())
                });
            }
        };

        info!("Found {} results for \"{}\"", results.len(), query);
        match results.first() {
            None => Ok(SearchOutcome::NoResults(query)),
            Some(top) if top.score >= threshold => {
                info!("Auto-selected high confidence match: {}", top.coin.name);
                Ok(SearchOutcome::AutoSelected(top.coin.clone()))
            }
            Some(_) => Ok(SearchOutcome::Results(CoinSearchState { query, results, page: 1 })),
        }
    }
}

pub fn prompt_screen(prompt: &str) -> Screen {
    Screen::new(prompt, InlineKeyboardMarkup::new(vec![go_back_row()]))
}

pub fn results_screen(prefix: &str, state: &CoinSearchState) -> Screen {
    let page = state.page.clamp(1, state.page_count());
    let start = (page - 1) * RESULTS_PER_PAGE;
    let end = (start + RESULTS_PER_PAGE).min(state.results.len());

    let mut rows: Vec<Vec<InlineKeyboardButton>> = state.results[start..end]
        .iter()
        .map(|r| {
            vec![InlineKeyboardButton::callback(
                r.coin.label(),
                format!("{}_select_{}", prefix, r.coin.id),
            )]
        })
        .collect();

    let mut pagination = Vec::new();
    if page > 1 {
        pagination.push(InlineKeyboardButton::callback("« Previous", format!("{}_prev_{}", prefix, page)));
    }
    if end < state.results.len() {
        pagination.push(InlineKeyboardButton::callback("Next »", format!("{}_next_{}", prefix, page)));
    }
    if !pagination.is_empty() {
        rows.push(pagination);
    }
    rows.push(go_back_row());

    let text = format!(
        "{}\n\nPlease select a coin from the list below:",
        bold(&format!("Search results for \"{}\"", state.query))
    );
    Screen::new(text, InlineKeyboardMarkup::new(rows))
}

pub fn no_results_screen(prefix: &str, query: &str) -> Screen {
    let text = format!(
        "{}\n\n{}",
        bold(&format!("No results found for \"{}\"", query)),
        escape_markdown("Please try another search term.")
    );
    Screen::new(
        text,
        InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("Retry Search", format!("{}_retry", prefix)),
            go_back_button(),
        ]]),
    )
}

/// Parse `{prefix}_select_{id}`, `{prefix}_prev_{page}`, `{prefix}_next_{page}` or `{prefix}_retry`.
pub fn parse_action(prefix: &str, data: &str) -> Option<SearchAction> {
    let rest = data.strip_prefix(prefix)?.strip_prefix('_')?;

    if rest == "retry" {
        return Some(SearchAction::Retry);
    }
    if let Some(id) = rest.strip_prefix("select_") {
        return (!id.is_empty()).then(|| SearchAction::Select(id.to_string()));
    }
    if let Some(page) = rest.strip_prefix("prev_") {
        let page: usize = page.parse().ok()?;
        return Some(SearchAction::Page(page.saturating_sub(1).max(1)));
    }
    if let Some(page) = rest.strip_prefix("next_") {
        let page: usize = page.parse().ok()?;
        return Some(SearchAction::Page(page + 1));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coin_search::MockCoinCatalog;

    fn search() -> CoinSearch {
        CoinSearch::new(
            Arc::new(MockCoinCatalog::new(Duration::ZERO)),
            Duration::from_secs(5),
            CircuitBreakerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_exact_match_auto_selects() {
        let outcome = search().process_search("bitcoin", 2.5).await.unwrap();
        assert!(matches!(outcome, SearchOutcome::AutoSelected(coin) if coin.id == "bitcoin"));
    }

    #[tokio::test]
    async fn test_weak_match_lists_results() {
        let outcome = search().process_search("coin", 2.5).await.unwrap();
        match outcome {
            SearchOutcome::Results(state) => {
                assert_eq!(state.page, 1);
                assert!(state.results.len() > 1);
            }
            other => panic!("expected a result list, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_and_missing_queries() {
        let search = search();
        assert_eq!(search.process_search("  <>  ", 2.5).await, Err(SearchError::EmptyQuery));
        assert_eq!(
            search.process_search("zzzz", 2.5).await,
            Ok(SearchOutcome::NoResults("zzzz".into()))
        );
    }

    #[test]
    fn test_results_pagination_buttons() {
        let results = (1..=7)
            .map(|i| SearchResult {
                coin: Coin {
                    id: format!("coin{}", i),
                    name: format!("Coin {}", i),
                    symbol: format!("C{}", i),
                    market_cap_rank: i,
                },
                score: 1.0,
            })
            .collect();
        let mut state = CoinSearchState { query: "coin".into(), results, page: 1 };

        let data = results_screen("coinsearch", &state).callback_data();
        assert_eq!(data.len(), 7);
        assert_eq!(data[0], "coinsearch_select_coin1");
        assert_eq!(data[5], "coinsearch_next_1");

        state.page = 2;
        let data = results_screen("coinsearch", &state).callback_data();
        assert_eq!(data, vec!["coinsearch_select_coin6", "coinsearch_select_coin7", "coinsearch_prev_2", "go_back"]);
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("coinsearch", "coinsearch_select_avalanche-2"), Some(SearchAction::Select("avalanche-2".into())));
        assert_eq!(parse_action("coinsearch", "coinsearch_next_1"), Some(SearchAction::Page(2)));
        assert_eq!(parse_action("coinsearch", "coinsearch_prev_2"), Some(SearchAction::Page(1)));
        assert_eq!(parse_action("coinsearch", "coinsearch_retry"), Some(SearchAction::Retry));
        assert_eq!(parse_action("coinsearch", "coinsearch_bogus"), None);
        assert_eq!(parse_action("coinsearch", "alert_type_PRICE_UP"), None);
    }
}

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trendsniper_bot::components::SearchOutcome;
use trendsniper_bot::constants::WIZARD_CONFIDENCE_THRESHOLD;
use trendsniper_bot::errors::{BotError, Result, SearchError};
use trendsniper_bot::middleware::CircuitState;
use trendsniper_bot::services::types::{Coin, SearchResult};
use trendsniper_bot::services::{CoinSearchApi, Services};

/// Search backend that fails every call and counts them.
#[derive(Default)]
struct FailingApi {
    calls: AtomicU32,
}

#[async_trait]
impl CoinSearchApi for FailingApi {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BotError::ServiceUnavailable("upstream down".into()))
    }

    async fn get_coin(&self, _id: &str) -> Result<Option<Coin>> {
        Ok(None)
    }
}

/// Search backend that never answers in time.
struct StalledApi;

#[async_trait]
impl CoinSearchApi for StalledApi {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    async fn get_coin(&self, _id: &str) -> Result<Option<Coin>> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn test_breaker_opens_after_repeated_failures() {
    let api = Arc::new(FailingApi::default());
    let services = Services::with_search_api(api.clone());
    let search = &services.coin_search;

    for _ in 0..3 {
        let err = search.process_search("btc", WIZARD_CONFIDENCE_THRESHOLD).await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream(_)));
    }
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    assert_eq!(search.breaker().state().await, CircuitState::Open);

    // rejected without reaching the backend
    let err = search.process_search("btc", WIZARD_CONFIDENCE_THRESHOLD).await.unwrap_err();
    assert_eq!(err, SearchError::CircuitOpen);
    assert!(err.user_message().contains("temporarily unavailable"));
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);

    tokio::time::advance(Duration::from_secs(31)).await;

    // the cool-down resets the count, so one more failure keeps the breaker closed
    let err = search.process_search("btc", WIZARD_CONFIDENCE_THRESHOLD).await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream(_)));
    assert_eq!(search.breaker().state().await, CircuitState::Closed);
    assert_eq!(search.breaker().consecutive_failures(), 1);

    let err = search.process_search("btc", WIZARD_CONFIDENCE_THRESHOLD).await.unwrap_err();
    assert!(matches!(err, SearchError::Upstream(_)));
    assert_eq!(api.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_slow_search_times_out() {
    let services = Services::with_search_api(Arc::new(StalledApi));

    let err = services
        .coin_search
        .process_search("btc", WIZARD_CONFIDENCE_THRESHOLD)
        .await
        .unwrap_err();
    assert_eq!(err, SearchError::Timeout);
    assert_eq!(services.coin_search.breaker().consecutive_failures(), 1);
}

#[tokio::test]
async fn test_blank_query_is_rejected_before_the_backend() {
    let api = Arc::new(FailingApi::default());
    let services = Services::with_search_api(api.clone());

    let err = services.coin_search.process_search("   ", 0.5).await.unwrap_err();
    assert_eq!(err, SearchError::EmptyQuery);
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_threshold_decides_auto_select() {
    let services = Services::in_memory();

    match services.coin_search.process_search("SOL", WIZARD_CONFIDENCE_THRESHOLD).await {
        Ok(SearchOutcome::AutoSelected(coin)) => assert_eq!(coin.id, "solana"),
        other => panic!("expected auto-select, got {:?}", other),
    }

    match services.coin_search.process_search("polka", WIZARD_CONFIDENCE_THRESHOLD).await {
        Ok(SearchOutcome::Results(state)) => {
            assert_eq!(state.page, 1);
            assert_eq!(state.results[0].coin.id, "polkadot");
        }
        other => panic!("expected a result list, got {:?}", other),
    }

    assert_eq!(
        services.coin_search.process_search("zzzz", WIZARD_CONFIDENCE_THRESHOLD).await,
        Ok(SearchOutcome::NoResults("zzzz".into()))
    );
}

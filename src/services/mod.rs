pub mod alert;
pub mod chart;
pub mod coin_search;
pub mod discovery;
pub mod options;
pub mod types;
pub mod watchlist;

use std::sync::Arc;
use std::time::Duration;

use crate::components::CoinSearch;
use crate::constants::{
    ALERT_SERVICE_DELAY, COIN_SEARCH_DELAY, DISCOVERY_SERVICE_DELAY, OPTIONS_SERVICE_DELAY,
    WATCHLIST_SERVICE_DELAY,
};
use crate::middleware::CircuitBreakerConfig;
use crate::utils::Config;

pub use alert::AlertService;
pub use chart::ChartService;
pub use coin_search::{CoinSearchApi, MockCoinCatalog};
pub use discovery::DiscoveryService;
pub use options::OptionsService;
pub use watchlist::WatchlistService;

pub(crate) async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Backends shared by every conversation.
pub struct Services {
    pub alerts: AlertService,
    pub watchlists: WatchlistService,
    pub discovery: DiscoveryService,
    pub options: OptionsService,
    pub charts: ChartService,
    pub coin_search: CoinSearch,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let latency = |delay: Duration| if config.simulate_latency { delay } else { Duration::ZERO };
        let breaker = CircuitBreakerConfig {
            failure_threshold: config.search_failure_threshold,
            timeout: config.search_cooldown(),
        };

        Self {
            alerts: AlertService::with_demo_data(latency(ALERT_SERVICE_DELAY)),
            watchlists: WatchlistService::with_demo_data(latency(WATCHLIST_SERVICE_DELAY)),
            discovery: DiscoveryService::new(latency(DISCOVERY_SERVICE_DELAY)),
            options: OptionsService::new(latency(OPTIONS_SERVICE_DELAY)),
            charts: ChartService::new(),
            coin_search: CoinSearch::new(
                Arc::new(MockCoinCatalog::new(latency(COIN_SEARCH_DELAY))),
                config.search_timeout(),
                breaker,
            ),
        }
    }

    /// Empty stores, no latency.
    pub fn in_memory() -> Self {
        Self::with_search_api(Arc::new(MockCoinCatalog::new(Duration::ZERO)))
    }

    /// Empty stores backed by a custom search API.
    pub fn with_search_api(api: Arc<dyn CoinSearchApi>) -> Self {
        Self {
            alerts: AlertService::new(Duration::ZERO),
            watchlists: WatchlistService::new(Duration::ZERO),
            discovery: DiscoveryService::new(Duration::ZERO),
            options: OptionsService::new(Duration::ZERO),
            charts: ChartService::new(),
            coin_search: CoinSearch::new(
                api,
                Duration::from_secs(crate::constants::DEFAULT_SEARCH_TIMEOUT_SECS),
                CircuitBreakerConfig::default(),
            ),
        }
    }
}

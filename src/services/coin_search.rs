use async_trait::async_trait;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::debug;

use crate::errors::Result;
use super::simulate_latency;
use super::types::{Coin, SearchResult};

/// Backend that resolves free text to coins.
#[async_trait]
pub trait CoinSearchApi: Send + Sync {
    /// Results ordered best first.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    async fn get_coin(&self, id: &str) -> Result<Option<Coin>>;
}

const CATALOG: &[(&str, &str, &str)] = &[
    ("bitcoin", "Bitcoin", "BTC"),
    ("ethereum", "Ethereum", "ETH"),
    ("binancecoin", "BNB", "BNB"),
    ("solana", "Solana", "SOL"),
    ("ripple", "XRP", "XRP"),
    ("cardano", "Cardano", "ADA"),
    ("dogecoin", "Dogecoin", "DOGE"),
    ("polkadot", "Polkadot", "DOT"),
    ("avalanche-2", "Avalanche", "AVAX"),
    ("tron", "Tron", "TRX"),
    ("chainlink", "Chainlink", "LINK"),
    ("litecoin", "Litecoin", "LTC"),
    ("uniswap", "Uniswap", "UNI"),
    ("cosmos", "Cosmos", "ATOM"),
    ("stellar", "Stellar", "XLM"),
    ("near", "NEAR Protocol", "NEAR"),
    ("algorand", "Algorand", "ALGO"),
    ("filecoin", "Filecoin", "FIL"),
    ("vechain", "VeChain", "VET"),
    ("hedera-hashgraph", "Hedera", "HBAR"),
    ("bitcoin-cash", "Bitcoin Cash", "BCH"),
    ("ethereum-classic", "Ethereum Classic", "ETC"),
];

/// In-memory coin catalog ranked by market cap.
pub struct MockCoinCatalog {
    coins: Vec<Coin>,
    latency: Duration,
}

impl MockCoinCatalog {
    pub fn new(latency: Duration) -> Self {
        let coins = CATALOG
            .iter()
            .enumerate()
            .map(|(i, (id, name, symbol))| Coin {
                id: id.to_string(),
                name: name.to_string(),
                symbol: symbol.to_string(),
                market_cap_rank: i as u32 + 1,
            })
            .collect();

        Self { coins, latency }
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    fn score(coin: &Coin, query: &str) -> f64 {
        let id = coin.id.to_lowercase();
        let name = coin.name.to_lowercase();
        let symbol = coin.symbol.to_lowercase();

        if id == query || name == query || symbol == query {
            3.0
        } else if id.starts_with(query) || name.starts_with(query) || symbol.starts_with(query) {
            2.0
        } else if id.contains(query) || name.contains(query) || symbol.contains(query) {
            1.0
        } else {
            0.0
        }
    }
}

#[async_trait]
impl CoinSearchApi for MockCoinCatalog {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        simulate_latency(self.latency).await;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<SearchResult> = self
            .coins
            .iter()
            .filter_map(|coin| {
                let score = Self::score(coin, &query);
                (score > 0.0).then(|| SearchResult { coin: coin.clone(), score })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.coin.market_cap_rank.cmp(&b.coin.market_cap_rank))
        });

        debug!("Catalog search '{}' matched {} coins", query, results.len());
        Ok(results)
    }

    async fn get_coin(&self, id: &str) -> Result<Option<Coin>> {
        simulate_latency(self.latency).await;
        Ok(self.coins.iter().find(|c| c.id == id).cloned())
    }
}

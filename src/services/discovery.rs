use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::info;

use crate::errors::{BotError, Result};
use super::coin_search::MockCoinCatalog;
use super::simulate_latency;
use super::types::{
    DiscoveryCoin, DiscoveryFeature, DiscoveryPage, DiscoveryQuery, Sentiment, StrengthType,
};

const DEFAULT_SEED: u64 = 0x7E4D_5A1B;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Market snapshot used by the discover features.
pub struct DiscoveryService {
    coins: Vec<DiscoveryCoin>,
    seed: u64,
    latency: Duration,
}

impl DiscoveryService {
    pub fn new(latency: Duration) -> Self {
        Self::with_seed(DEFAULT_SEED, latency)
    }

    pub fn with_seed(seed: u64, latency: Duration) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let catalog = MockCoinCatalog::new(Duration::ZERO);

        let coins: Vec<DiscoveryCoin> = catalog
            .coins()
            .iter()
            .map(|coin| DiscoveryCoin {
                id: coin.id.clone(),
                name: coin.name.clone(),
                symbol: coin.symbol.clone(),
                price: Self::random_price(&mut rng),
                percent_change_24h: round_to(rng.gen_range(-10.0..10.0), 2),
                volume_24h: rng.gen_range(0.0..1_000_000_000.0f64).floor(),
                market_cap: rng.gen_range(0.0..10_000_000_000.0f64).floor(),
                trend_score: round_to(rng.gen_range(0.0..100.0), 1),
                rsi: round_to(rng.gen_range(0.0..100.0), 1),
            })
            .collect();

        info!("Initialized {} mock coins for discovery", coins.len());
        Self { coins, seed, latency }
    }

    fn random_price(rng: &mut StdRng) -> f64 {
        let base: f64 = rng.gen_range(0.0..1000.0);
        match base {
            b if b < 1.0 => round_to(b, 4),
            b if b < 10.0 => round_to(b, 3),
            b if b < 100.0 => round_to(b, 2),
            b => b.round(),
        }
    }

    pub fn coins(&self) -> &[DiscoveryCoin] {
        &self.coins
    }

    pub async fn discover(&self, query: &DiscoveryQuery) -> Result<DiscoveryPage> {
        if query.page == 0 || query.limit == 0 {
            return Err(BotError::validation("Page and limit must be positive"));
        }

        info!("Getting discovery results for {:?}", query.feature);
        simulate_latency(self.latency).await;

        let mut coins = self.coins.clone();
        match &query.feature {
            DiscoveryFeature::Strength(strength) => {
                coins.sort_by(|a, b| cmp_f64(b.percent_change_24h, a.percent_change_24h));
                if *strength == StrengthType::Weakest {
                    coins.reverse();
                }
            }
            DiscoveryFeature::Signals { sentiment, .. } => match sentiment {
                Sentiment::BullishToBearish => {
                    coins.retain(|c| c.trend_score > 60.0 && c.percent_change_24h < 0.0);
                    coins.sort_by(|a, b| cmp_f64(b.trend_score, a.trend_score));
                }
                Sentiment::BearishToBullish => {
                    coins.retain(|c| c.trend_score < 40.0 && c.percent_change_24h > 0.0);
                    coins.sort_by(|a, b| cmp_f64(a.trend_score, b.trend_score));
                }
            },
            DiscoveryFeature::MarketCap => {
                // No real ranking data, order is stable per seed
                let mut rng = StdRng::seed_from_u64(self.seed);
                coins.shuffle(&mut rng);
            }
            DiscoveryFeature::Volume => {
                coins.sort_by(|a, b| cmp_f64(b.volume_24h, a.volume_24h));
            }
        }

        let total_items = coins.len();
        let start = (query.page - 1) * query.limit;
        let page_coins: Vec<DiscoveryCoin> =
            coins.into_iter().skip(start).take(query.limit).collect();

        Ok(DiscoveryPage {
            coins: page_coins,
            total_items,
            page: query.page,
            has_more: start + query.limit < total_items,
        })
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

use chrono::Utc;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::constants::DEMO_USER_ID;
use crate::errors::{BotError, Result};
use super::simulate_latency;
use super::types::Watchlist;

pub struct WatchlistService {
    watchlists: RwLock<IndexMap<String, Watchlist>>,
    next_id: AtomicU64,
    latency: Duration,
}

impl WatchlistService {
    pub fn new(latency: Duration) -> Self {
        Self {
            watchlists: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            latency,
        }
    }

    /// Service preloaded with two watchlists for the demo account.
    pub fn with_demo_data(latency: Duration) -> Self {
        let mut service = Self::new(latency);
        let seeds = [
            ("Top Coins", vec!["bitcoin", "ethereum", "solana"]),
            ("DeFi", vec!["uniswap", "chainlink"]),
        ];

        let mut watchlists = IndexMap::new();
        for (name, coins) in seeds {
            let id = service.allocate_id();
            watchlists.insert(
                id.clone(),
                Watchlist {
                    id,
                    name: name.to_string(),
                    telegram_id: DEMO_USER_ID.to_string(),
                    is_group: false,
                    coins: coins.into_iter().map(String::from).collect(),
                    created_at: Utc::now(),
                },
            );
        }

        *service.watchlists.get_mut() = watchlists;
        service
    }

    fn allocate_id(&self) -> String {
        format!("watch{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn get_watchlists(&self, telegram_id: &str, is_group: bool) -> Vec<Watchlist> {
        simulate_latency(self.latency).await;
        self.watchlists
            .read()
            .await
            .values()
            .filter(|w| w.telegram_id == telegram_id && w.is_group == is_group)
            .cloned()
            .collect()
    }

    pub async fn get_watchlist_by_id(&self, id: &str) -> Option<Watchlist> {
        simulate_latency(self.latency).await;
        self.watchlists.read().await.get(id).cloned()
    }

    pub async fn create_watchlist(&self, telegram_id: &str, is_group: bool, name: &str) -> Result<Watchlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BotError::validation("Watchlist name cannot be empty"));
        }

        simulate_latency(self.latency).await;
        let watchlist = Watchlist {
            id: self.allocate_id(),
            name: name.to_string(),
            telegram_id: telegram_id.to_string(),
            is_group,
            coins: Vec::new(),
            created_at: Utc::now(),
        };

        self.watchlists
            .write()
            .await
            .insert(watchlist.id.clone(), watchlist.clone());
        info!("Created watchlist {} '{}' for {}", watchlist.id, watchlist.name, telegram_id);
        Ok(watchlist)
    }

    /// Only the owner may delete a watchlist.
    pub async fn delete_watchlist(&self, telegram_id: &str, id: &str) -> bool {
        simulate_latency(self.latency).await;
        let mut watchlists = self.watchlists.write().await;

        match watchlists.get(id) {
            Some(w) if w.telegram_id == telegram_id => {
                watchlists.shift_remove(id);
                info!("Deleted watchlist {} for {}", id, telegram_id);
                true
            }
            Some(_) => {
                warn!("User {} tried to delete watchlist {} they do not own", telegram_id, id);
                false
            }
            None => {
                warn!("Attempted to delete non-existent watchlist: {}", id);
                false
            }
        }
    }

    /// Add a coin to a watchlist. Adding a coin twice is a no-op.
    pub async fn add_coin(&self, watchlist_id: &str, coin_id: &str) -> Result<Watchlist> {
        simulate_latency(self.latency).await;
        let mut watchlists = self.watchlists.write().await;
        let watchlist = watchlists
            .get_mut(watchlist_id)
            .ok_or_else(|| BotError::not_found("Watchlist"))?;

        if !watchlist.coins.iter().any(|c| c == coin_id) {
            watchlist.coins.push(coin_id.to_string());
        }
        Ok(watchlist.clone())
    }
}

use chrono::{Duration as ChronoDuration, Utc};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::constants::{
    DEMO_USER_ID, DISCOVERY_ALERT_LIMIT, INDICATOR_LIMIT, PRICE_LEVEL_LIMIT, WATCHLIST_ALERT_LIMIT,
};
use crate::errors::{BotError, Result};
use super::simulate_latency;
use super::types::{
    Alert, AlertKind, AlertLimits, AlertStatus, AlertType, AlertsSummary, NewAlert, Pairing,
    RemainingAlerts, TimeFrame,
};

/// In-memory alert store.
pub struct AlertService {
    alerts: RwLock<IndexMap<String, Alert>>,
    next_id: AtomicU64,
    limits: AlertLimits,
    latency: Duration,
}

impl AlertService {
    pub fn new(latency: Duration) -> Self {
        Self {
            alerts: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            limits: AlertLimits {
                watchlist_limit: WATCHLIST_ALERT_LIMIT,
                discovery_limit: DISCOVERY_ALERT_LIMIT,
                indicator_limit: INDICATOR_LIMIT,
                price_level_limit: PRICE_LEVEL_LIMIT,
            },
            latency,
        }
    }

    /// Service preloaded with the demo account's alerts.
    pub fn with_demo_data(latency: Duration) -> Self {
        let mut service = Self::new(latency);
        let now = Utc::now();

        let seeds = [
            ("bitcoin", "Bitcoin (BTC)", AlertType::MarketTransition, TimeFrame::D1,
             vec!["Trend Momentum".to_string(), "Buying Pressure".to_string()], Vec::new(), 7),
            ("ethereum", "Ethereum (ETH)", AlertType::MarketTransition, TimeFrame::H6,
             Vec::new(), vec!["Bearish to Bullish".to_string()], 3),
            ("bitcoin", "Bitcoin (BTC)", AlertType::LevelBreak, TimeFrame::D1,
             Vec::new(), vec!["Support Break".to_string()], 2),
            ("ethereum", "Ethereum (ETH)", AlertType::LevelBreak, TimeFrame::D1,
             Vec::new(), vec!["Resistance Break".to_string()], 1),
        ];

        let mut alerts = IndexMap::new();
        for (coin_id, coin_name, alert_type, timeframe, indicators, conditions, age_days) in seeds {
            let created_at = now - ChronoDuration::days(age_days);
            let id = service.allocate_id();
            alerts.insert(
                id.clone(),
                Alert {
                    id,
                    user_id: DEMO_USER_ID.to_string(),
                    kind: AlertKind::Discovery,
                    alert_type,
                    coin_id: Some(coin_id.to_string()),
                    coin_name: Some(coin_name.to_string()),
                    watchlist_id: None,
                    watchlist_name: None,
                    threshold: None,
                    timeframe,
                    pairing: Pairing::Usd,
                    message: None,
                    indicators,
                    conditions,
                    status: AlertStatus::Active,
                    created_at,
                    updated_at: created_at,
                },
            );
        }

        info!("Initialized {} mock alerts", alerts.len());
        *service.alerts.get_mut() = alerts;
        service
    }

    fn allocate_id(&self) -> String {
        format!("alert_{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an alert. The limit check and the insert share one write lock.
    pub async fn create_alert(&self, new_alert: NewAlert) -> Result<Alert> {
        if new_alert.indicators.len() > self.limits.indicator_limit {
            return Err(BotError::validation(format!(
                "Maximum {} indicators allowed per alert",
                self.limits.indicator_limit
            )));
        }

        let alert = {
            let mut alerts = self.alerts.write().await;

            match new_alert.kind {
                AlertKind::Watchlist => {
                    let watchlist_id = new_alert
                        .watchlist_id
                        .as_deref()
                        .ok_or_else(|| BotError::validation("A watchlist alert needs a watchlist"))?;
                    let existing = alerts
                        .values()
                        .filter(|a| {
                            a.user_id == new_alert.user_id
                                && a.watchlist_id.as_deref() == Some(watchlist_id)
                        })
                        .count();
                    if existing >= self.limits.watchlist_limit {
                        return Err(BotError::LimitExceeded {
                            kind: "watchlist".into(),
                            limit: self.limits.watchlist_limit,
                        });
                    }
                }
                AlertKind::Discovery => {
                    let existing = alerts
                        .values()
                        .filter(|a| a.user_id == new_alert.user_id && a.kind == AlertKind::Discovery)
                        .count();
                    if existing >= self.limits.discovery_limit {
                        return Err(BotError::LimitExceeded {
                            kind: "discovery".into(),
                            limit: self.limits.discovery_limit,
                        });
                    }
                }
            }

            let now = Utc::now();
            let alert = Alert {
                id: self.allocate_id(),
                user_id: new_alert.user_id,
                kind: new_alert.kind,
                alert_type: new_alert.alert_type,
                coin_id: new_alert.coin_id,
                coin_name: new_alert.coin_name,
                watchlist_id: new_alert.watchlist_id,
                watchlist_name: new_alert.watchlist_name,
                threshold: new_alert.threshold,
                timeframe: new_alert.timeframe,
                pairing: new_alert.pairing,
                message: new_alert.message,
                indicators: new_alert.indicators,
                conditions: new_alert.conditions,
                status: AlertStatus::Active,
                created_at: now,
                updated_at: now,
            };
            alerts.insert(alert.id.clone(), alert.clone());
            alert
        };

        info!(
            "Created alert {} ({}) for user {}",
            alert.id,
            alert.alert_type.as_str(),
            alert.user_id
        );
        simulate_latency(self.latency).await;
        Ok(alert)
    }

    pub async fn get_alerts(&self, user_id: &str, kind: Option<AlertKind>) -> Vec<Alert> {
        simulate_latency(self.latency).await;
        let alerts = self.alerts.read().await;
        alerts
            .values()
            .filter(|a| a.user_id == user_id && kind.map_or(true, |k| a.kind == k))
            .cloned()
            .collect()
    }

    /// Watchlist alerts of a user, optionally narrowed to one watchlist.
    pub async fn get_watchlist_alerts(&self, user_id: &str, watchlist_id: Option<&str>) -> Vec<Alert> {
        let alerts = self.get_alerts(user_id, Some(AlertKind::Watchlist)).await;
        match watchlist_id {
            Some(id) => alerts
                .into_iter()
                .filter(|a| a.watchlist_id.as_deref() == Some(id))
                .collect(),
            None => alerts,
        }
    }

    pub async fn get_discovery_alerts(&self, user_id: &str) -> Vec<Alert> {
        self.get_alerts(user_id, Some(AlertKind::Discovery)).await
    }

    pub async fn get_alert_by_id(&self, alert_id: &str) -> Option<Alert> {
        simulate_latency(self.latency).await;
        self.alerts.read().await.get(alert_id).cloned()
    }

    /// Returns `false` when no alert has this id.
    pub async fn delete_alert(&self, alert_id: &str) -> bool {
        simulate_latency(self.latency).await;
        let removed = self.alerts.write().await.shift_remove(alert_id);

        match removed {
            Some(alert) => {
                info!("Deleted alert {} for user {}", alert.id, alert.user_id);
                true
            }
            None => {
                warn!("Attempted to delete non-existent alert: {}", alert_id);
                false
            }
        }
    }

    pub async fn toggle_alert_status(&self, alert_id: &str) -> Option<Alert> {
        simulate_latency(self.latency).await;
        let mut alerts = self.alerts.write().await;
        let alert = alerts.get_mut(alert_id)?;

        alert.status = match alert.status {
            AlertStatus::Active => AlertStatus::Inactive,
            AlertStatus::Inactive => AlertStatus::Active,
        };
        alert.updated_at = Utc::now();
        debug!("Alert {} is now {:?}", alert.id, alert.status);
        Some(alert.clone())
    }

    pub async fn get_alerts_summary(&self, user_id: &str) -> AlertsSummary {
        let alerts = self.get_alerts(user_id, None).await;
        let watchlist_alerts = alerts.iter().filter(|a| a.kind == AlertKind::Watchlist).count();
        let discovery_alerts = alerts.iter().filter(|a| a.kind == AlertKind::Discovery).count();

        AlertsSummary {
            total_alerts: alerts.len(),
            active_alerts: alerts.iter().filter(|a| a.is_active()).count(),
            watchlist_alerts,
            discovery_alerts,
            remaining: RemainingAlerts {
                watchlist: self.limits.watchlist_limit.saturating_sub(watchlist_alerts),
                discovery: self.limits.discovery_limit.saturating_sub(discovery_alerts),
            },
        }
    }

    pub fn limits(&self) -> AlertLimits {
        self.limits
    }
}

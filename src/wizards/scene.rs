//! The wizard a chat is currently in, and how callback tokens start one.

use tracing::warn;

use crate::bot::handlers::menu::Menu;
use crate::components::Reply;
use crate::services::types::{AlertKind, Coin};
use super::add_coin::{AddCoinParams, AddCoinStep, AddCoinWizard};
use super::alert::{AlertParams, AlertStep, AlertVariant, AlertWizard, WatchlistRef};
use super::alert_browser::{AlertBrowser, BrowserParams, BrowserStep};
use super::charting::{ChartParams, ChartStep, ChartingWizard};
use super::delete_alert::{DeleteAlertParams, DeleteAlertStep, DeleteAlertWizard};
use super::delete_watchlist::{DeleteWatchlistParams, DeleteWatchlistStep, DeleteWatchlistWizard};
use super::discovery_alerts::{DiscoveryAlertsStep, DiscoveryAlertsWizard};
use super::latest_signals::{LatestSignalsWizard, SignalsParams, SignalsStep};
use super::machine::{self, Input, Progress, StepContext, WizardState};
use super::strength::{StrengthParams, StrengthStep, StrengthWizard};
use super::watchlist_alerts::{WatchlistAlertsParams, WatchlistAlertsStep, WatchlistAlertsWizard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Alert(AlertVariant),
    /// `Some` skips the filter question.
    DeleteAlert(Option<AlertKind>),
    AlertBrowser,
    WatchlistAlerts,
    DiscoveryAlerts,
    Strength,
    LatestSignals,
    Charting,
    AddCoin,
    DeleteWatchlist,
}

/// A wizard start request, optionally about a specific coin or watchlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: SceneKind,
    pub coin_id: Option<String>,
    pub watchlist_id: Option<String>,
}

impl Entry {
    pub fn new(kind: SceneKind) -> Self {
        Self { kind, coin_id: None, watchlist_id: None }
    }

    pub fn for_coin(kind: SceneKind, coin_id: impl Into<String>) -> Self {
        Self { coin_id: Some(coin_id.into()), ..Self::new(kind) }
    }

    pub fn for_watchlist(kind: SceneKind, watchlist_id: impl Into<String>) -> Self {
        Self { watchlist_id: Some(watchlist_id.into()), ..Self::new(kind) }
    }

    /// Entry named by a callback token, if any.
    pub fn from_callback(data: &str) -> Option<Self> {
        let kind = match data {
            "start_wizard" | "create_alert" => SceneKind::Alert(AlertVariant::Create),
            "create_discovery_alert" => SceneKind::Alert(AlertVariant::Discovery),
            "create_market_transition_alert" => SceneKind::Alert(AlertVariant::MarketTransition),
            "create_level_break_alert" => SceneKind::Alert(AlertVariant::LevelBreak),
            "delete_alert" => SceneKind::DeleteAlert(None),
            "delete_watchlist_alerts" => SceneKind::DeleteAlert(Some(AlertKind::Watchlist)),
            "delete_discovery_alerts" => SceneKind::DeleteAlert(Some(AlertKind::Discovery)),
            "show_all_alerts" => SceneKind::AlertBrowser,
            "show_watchlist_alerts" => SceneKind::WatchlistAlerts,
            "show_discovery_alerts" => SceneKind::DiscoveryAlerts,
            "strength_wizard" => SceneKind::Strength,
            "latest_signals_wizard" => SceneKind::LatestSignals,
            "charting_wizard" => SceneKind::Charting,
            "add_coin" => SceneKind::AddCoin,
            "delete_watchlist" => SceneKind::DeleteWatchlist,
            _ => {
                let entry = if let Some(id) = data.strip_prefix("chart_") {
                    Self::for_coin(SceneKind::Charting, id)
                } else if let Some(id) = data.strip_prefix("watchlist_add_") {
                    Self::for_coin(SceneKind::AddCoin, id)
                } else if let Some(id) = data.strip_prefix("create_alert_in_") {
                    Self::for_watchlist(SceneKind::Alert(AlertVariant::Create), id)
                } else {
                    return None;
                };
                let id = entry.coin_id.as_deref().or(entry.watchlist_id.as_deref()).unwrap_or_default();
                if id.is_empty() {
                    return None;
                }
                return Some(entry);
            }
        };
        Some(Self::new(kind))
    }
}

/// Running wizard state, one variant per wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Alert(AlertWizard, WizardState<AlertStep, AlertParams>),
    DeleteAlert(WizardState<DeleteAlertStep, DeleteAlertParams>),
    AlertBrowser(WizardState<BrowserStep, BrowserParams>),
    WatchlistAlerts(WizardState<WatchlistAlertsStep, WatchlistAlertsParams>),
    DiscoveryAlerts(WizardState<DiscoveryAlertsStep, ()>),
    Strength(WizardState<StrengthStep, StrengthParams>),
    LatestSignals(WizardState<SignalsStep, SignalsParams>),
    Charting(WizardState<ChartStep, ChartParams>),
    AddCoin(WizardState<AddCoinStep, AddCoinParams>),
    DeleteWatchlist(WizardState<DeleteWatchlistStep, DeleteWatchlistParams>),
}

impl Scene {
    pub fn name(&self) -> &'static str {
        match self {
            Scene::Alert(wizard, _) => machine::Flow::name(wizard),
            Scene::DeleteAlert(_) => "delete_alert",
            Scene::AlertBrowser(_) => "alert_browser",
            Scene::WatchlistAlerts(_) => "watchlist_alerts",
            Scene::DiscoveryAlerts(_) => "discovery_alerts",
            Scene::Strength(_) => "strength",
            Scene::LatestSignals(_) => "latest_signals",
            Scene::Charting(_) => "charting",
            Scene::AddCoin(_) => "add_coin",
            Scene::DeleteWatchlist(_) => "delete_watchlist",
        }
    }
}

async fn resolve_coin(coin_id: &str, ctx: &StepContext) -> Option<Coin> {
    match ctx.services.coin_search.get_coin(coin_id).await {
        Ok(coin) => coin,
        Err(e) => {
            warn!("Could not look up coin {}: {}", coin_id, e);
            None
        }
    }
}

/// The user's own watchlist, if the id names one.
async fn resolve_watchlist(watchlist_id: &str, ctx: &StepContext) -> Option<WatchlistRef> {
    ctx.services
        .watchlists
        .get_watchlist_by_id(watchlist_id)
        .await
        .filter(|w| w.telegram_id == ctx.user_id)
        .map(|w| WatchlistRef { id: w.id, name: w.name })
}

/// Start the wizard an entry names.
pub async fn start(entry: Entry, ctx: &StepContext) -> Progress<Scene> {
    let watchlist = match entry.watchlist_id.as_deref() {
        Some(id) => match resolve_watchlist(id, ctx).await {
            Some(watchlist) => Some(watchlist),
            None => {
                return Progress {
                    state: None,
                    replies: vec![Reply::notice("Watchlist not found.")],
                    exit_to: Some(Menu::Alerts),
                }
            }
        },
        None => None,
    };

    let coin = match entry.coin_id.as_deref() {
        Some(id) => match resolve_coin(id, ctx).await {
            Some(coin) => Some(coin),
            None => {
                return Progress {
                    state: None,
                    replies: vec![Reply::notice("Coin not found.")],
                    exit_to: Some(Menu::Main),
                }
            }
        },
        None => None,
    };

    match entry.kind {
        SceneKind::Alert(variant) => {
            let wizard = AlertWizard::new(variant);
            let params = match watchlist {
                Some(watchlist) if variant == AlertVariant::Create => AlertWizard::watchlist_params(watchlist),
                _ => wizard.initial_params(),
            };
            machine::enter(&wizard, params, ctx)
                .await
                .map(|s| Scene::Alert(wizard, s))
        }
        SceneKind::DeleteAlert(kind) => {
            let params = kind.map(DeleteAlertParams::for_kind).unwrap_or_default();
            machine::enter(&DeleteAlertWizard, params, ctx)
                .await
                .map(Scene::DeleteAlert)
        }
        SceneKind::AlertBrowser => machine::enter(&AlertBrowser, BrowserParams::default(), ctx)
            .await
            .map(Scene::AlertBrowser),
        SceneKind::WatchlistAlerts => {
            machine::enter(&WatchlistAlertsWizard, WatchlistAlertsParams::default(), ctx)
                .await
                .map(Scene::WatchlistAlerts)
        }
        SceneKind::DiscoveryAlerts => machine::enter(&DiscoveryAlertsWizard, (), ctx)
            .await
            .map(Scene::DiscoveryAlerts),
        SceneKind::Strength => machine::enter(&StrengthWizard, StrengthParams::default(), ctx)
            .await
            .map(Scene::Strength),
        SceneKind::LatestSignals => machine::enter(&LatestSignalsWizard, SignalsParams::default(), ctx)
            .await
            .map(Scene::LatestSignals),
        SceneKind::Charting => {
            let params = coin.map(ChartParams::for_coin).unwrap_or_default();
            machine::enter(&ChartingWizard, params, ctx).await.map(Scene::Charting)
        }
        SceneKind::AddCoin => {
            let params = coin.map(AddCoinParams::for_coin).unwrap_or_default();
            machine::enter(&AddCoinWizard, params, ctx).await.map(Scene::AddCoin)
        }
        SceneKind::DeleteWatchlist => {
            machine::enter(&DeleteWatchlistWizard, DeleteWatchlistParams::default(), ctx)
                .await
                .map(Scene::DeleteWatchlist)
        }
    }
}

/// Feed one input to the running wizard.
pub async fn feed(scene: Scene, input: Input<'_>, ctx: &StepContext) -> Progress<Scene> {
    match scene {
        Scene::Alert(wizard, state) => machine::dispatch(&wizard, state, input, ctx)
            .await
            .map(|s| Scene::Alert(wizard, s)),
        Scene::DeleteAlert(state) => machine::dispatch(&DeleteAlertWizard, state, input, ctx)
            .await
            .map(Scene::DeleteAlert),
        Scene::AlertBrowser(state) => machine::dispatch(&AlertBrowser, state, input, ctx)
            .await
            .map(Scene::AlertBrowser),
        Scene::WatchlistAlerts(state) => machine::dispatch(&WatchlistAlertsWizard, state, input, ctx)
            .await
            .map(Scene::WatchlistAlerts),
        Scene::DiscoveryAlerts(state) => machine::dispatch(&DiscoveryAlertsWizard, state, input, ctx)
            .await
            .map(Scene::DiscoveryAlerts),
        Scene::Strength(state) => machine::dispatch(&StrengthWizard, state, input, ctx)
            .await
            .map(Scene::Strength),
        Scene::LatestSignals(state) => machine::dispatch(&LatestSignalsWizard, state, input, ctx)
            .await
            .map(Scene::LatestSignals),
        Scene::Charting(state) => machine::dispatch(&ChartingWizard, state, input, ctx)
            .await
            .map(Scene::Charting),
        Scene::AddCoin(state) => machine::dispatch(&AddCoinWizard, state, input, ctx)
            .await
            .map(Scene::AddCoin),
        Scene::DeleteWatchlist(state) => machine::dispatch(&DeleteWatchlistWizard, state, input, ctx)
            .await
            .map(Scene::DeleteWatchlist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_tokens() {
        assert_eq!(
            Entry::from_callback("start_wizard").map(|e| e.kind),
            Some(SceneKind::Alert(AlertVariant::Create))
        );
        assert_eq!(
            Entry::from_callback("create_level_break_alert").map(|e| e.kind),
            Some(SceneKind::Alert(AlertVariant::LevelBreak))
        );
        assert_eq!(
            Entry::from_callback("chart_bitcoin"),
            Some(Entry::for_coin(SceneKind::Charting, "bitcoin"))
        );
        assert_eq!(
            Entry::from_callback("create_alert_in_watch2"),
            Some(Entry::for_watchlist(SceneKind::Alert(AlertVariant::Create), "watch2"))
        );
        assert_eq!(
            Entry::from_callback("delete_discovery_alerts").map(|e| e.kind),
            Some(SceneKind::DeleteAlert(Some(AlertKind::Discovery)))
        );
        assert_eq!(Entry::from_callback("create_alert_in_"), None);
        assert_eq!(
            Entry::from_callback("watchlist_add_solana").and_then(|e| e.coin_id),
            Some("solana".to_string())
        );
        assert_eq!(Entry::from_callback("chart_"), None);
        assert_eq!(Entry::from_callback("delete_alert_alert_1"), None);
        assert_eq!(Entry::from_callback("go_back"), None);
    }
}

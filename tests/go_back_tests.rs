use std::sync::Arc;
use std::time::Duration;

use trendsniper_bot::bot::handlers::Menu;
use trendsniper_bot::components::{Reply, Screen};
use trendsniper_bot::services::types::{AlertKind, AlertType, NewAlert, Pairing, TimeFrame};
use trendsniper_bot::services::Services;
use trendsniper_bot::wizards::scene::{self, Entry, Scene, SceneKind};
use trendsniper_bot::wizards::{AlertVariant, Input, Progress, StepContext};

/// One user action inside a wizard.
enum Act {
    Press(String),
    Type(String),
}

fn press(data: impl Into<String>) -> Act {
    Act::Press(data.into())
}

fn type_text(text: impl Into<String>) -> Act {
    Act::Type(text.into())
}

fn last_screen(progress: &Progress<Scene>) -> Screen {
    progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .cloned()
        .expect("a screen should have been rendered")
}

async fn feed(progress: Progress<Scene>, act: &Act, ctx: &StepContext) -> Progress<Scene> {
    let current = progress.state.expect("wizard should still be running");
    let input = match act {
        Act::Press(data) => Input::Callback(data),
        Act::Type(text) => Input::Text(text),
    };
    scene::feed(current, input, ctx).await
}

/// Walks forward one step per group of actions, then presses Go Back until
/// the wizard is left, checking every step shows the screen it showed first.
async fn assert_go_back_retraces(ctx: &StepContext, entry: Entry, moves: Vec<Vec<Act>>, parent: Menu) {
    let mut progress = scene::start(entry.clone(), ctx).await;
    let mut shown = vec![last_screen(&progress)];

    for group in &moves {
        for act in group {
            progress = feed(progress, act, ctx).await;
        }
        shown.push(last_screen(&progress));
    }

    shown.pop();
    while let Some(expected) = shown.pop() {
        progress = feed(progress, &press("go_back"), ctx).await;
        assert_eq!(last_screen(&progress), expected, "{:?}: go back after {} steps", entry.kind, shown.len());
    }

    progress = feed(progress, &press("go_back"), ctx).await;
    assert!(progress.is_finished(), "{:?} should leave on its first step", entry.kind);
    assert_eq!(progress.exit_to, Some(parent));
}

fn setup() -> (Arc<Services>, StepContext) {
    let services = Arc::new(Services::in_memory());
    let ctx = StepContext::new(services.clone(), "42", Duration::from_secs(20));
    (services, ctx)
}

fn discovery_alert() -> NewAlert {
    NewAlert {
        user_id: "42".into(),
        kind: AlertKind::Discovery,
        alert_type: AlertType::LevelBreak,
        coin_id: None,
        coin_name: None,
        watchlist_id: None,
        watchlist_name: None,
        threshold: None,
        timeframe: TimeFrame::H4,
        pairing: Pairing::Usd,
        message: None,
        indicators: vec!["RSI".into()],
        conditions: vec!["Support Break".into()],
    }
}

#[tokio::test]
async fn test_create_alert_watchlist_path_retraces() {
    let (services, ctx) = setup();
    let watchlist = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();

    let moves = vec![
        vec![press("select_alert_watchlist")],
        vec![type_text("bitcoin")],
        vec![press(format!("select_watchlist_{}", watchlist.id))],
        vec![press("alert_type_PRICE_UP")],
        vec![type_text("50000")],
        vec![press("timeframe_H12")],
        vec![press("pairing_USD")],
        vec![press("message_skip")],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::Alert(AlertVariant::Create)), moves, Menu::Alerts).await;
}

#[tokio::test]
async fn test_discovery_alert_retraces_through_pickers() {
    let (_, ctx) = setup();

    let moves = vec![
        vec![type_text("bit")],
        vec![press("coinsearch_select_bitcoin")],
        vec![press("alert_type_MARKET_TRANSITION")],
        vec![press("indicator_picker_option_RSI"), press("indicator_picker_CHOOSE")],
        vec![
            press("transition_picker_option_Bullish to Bearish"),
            press("transition_picker_CHOOSE"),
        ],
        vec![press("cmbpicker_CHOOSE")],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::Alert(AlertVariant::Discovery)), moves, Menu::Alerts).await;
}

#[tokio::test]
async fn test_condition_alerts_retrace() {
    let (_, ctx) = setup();

    let transition = vec![
        vec![press("transition_type_Bearish to Bullish")],
        vec![press("timeframe_D1")],
        vec![press("pairing_BTC")],
    ];
    assert_go_back_retraces(
        &ctx,
        Entry::new(SceneKind::Alert(AlertVariant::MarketTransition)),
        transition,
        Menu::Alerts,
    )
    .await;

    let level_break = vec![
        vec![press("break_type_Support Break")],
        vec![press("timeframe_H4")],
        vec![press("pairing_ETH")],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::Alert(AlertVariant::LevelBreak)), level_break, Menu::Alerts)
        .await;
}

#[tokio::test]
async fn test_delete_alert_retraces() {
    let (services, ctx) = setup();
    let alert = services.alerts.create_alert(discovery_alert()).await.unwrap();

    let moves = vec![
        vec![press("select_type_all")],
        vec![press(format!("select_alert_{}", alert.id))],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::DeleteAlert(None)), moves, Menu::Alerts).await;
}

#[tokio::test]
async fn test_alert_browser_retraces() {
    let (services, ctx) = setup();
    let alert = services.alerts.create_alert(discovery_alert()).await.unwrap();

    let moves = vec![
        vec![press(format!("view_alert_{}", alert.id))],
        vec![press(format!("delete_alert_{}", alert.id))],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::AlertBrowser), moves, Menu::Alerts).await;
}

#[tokio::test]
async fn test_discovery_wizards_retrace() {
    let (_, ctx) = setup();

    assert_go_back_retraces(
        &ctx,
        Entry::new(SceneKind::Strength),
        vec![vec![press("strength_type_weakest")]],
        Menu::Discover,
    )
    .await;

    let signals = vec![
        vec![press("indicator_RSI")],
        vec![press("sentiment_bullish_to_bearish")],
    ];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::LatestSignals), signals, Menu::Discover).await;
}

#[tokio::test]
async fn test_coin_wizards_retrace() {
    let (services, ctx) = setup();
    services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();

    let moves = || vec![vec![type_text("bit")], vec![press("coinsearch_select_bitcoin")]];
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::Charting), moves(), Menu::Main).await;
    assert_go_back_retraces(&ctx, Entry::new(SceneKind::AddCoin), moves(), Menu::Watchlists).await;
}

#[tokio::test]
async fn test_watchlist_wizards_retrace() {
    let (services, ctx) = setup();
    let watchlist = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();

    assert_go_back_retraces(
        &ctx,
        Entry::new(SceneKind::DeleteWatchlist),
        vec![vec![press(format!("select_watchlist_to_delete_{}", watchlist.id))]],
        Menu::Watchlists,
    )
    .await;

    assert_go_back_retraces(
        &ctx,
        Entry::new(SceneKind::WatchlistAlerts),
        vec![vec![press(format!("select_watchlist_{}", watchlist.id))]],
        Menu::Alerts,
    )
    .await;

    assert_go_back_retraces(&ctx, Entry::new(SceneKind::DiscoveryAlerts), Vec::new(), Menu::Alerts).await;
}

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use trendsniper_bot::bot::handlers::Menu;
use trendsniper_bot::components::Reply;
use trendsniper_bot::services::types::{AlertKind, AlertStatus, AlertType, NewAlert, Pairing, TimeFrame};
use trendsniper_bot::services::Services;
use trendsniper_bot::wizards::alert::AlertStep;
use trendsniper_bot::wizards::scene::{self, Entry, Scene, SceneKind};
use trendsniper_bot::wizards::{AlertVariant, Input, Progress, StepContext};

fn context(services: Arc<Services>) -> StepContext {
    StepContext::new(services, "42", Duration::from_secs(20))
}

async fn start(kind: SceneKind, ctx: &StepContext) -> Progress<Scene> {
    scene::start(Entry::new(kind), ctx).await
}

async fn press(progress: Progress<Scene>, data: &str, ctx: &StepContext) -> Progress<Scene> {
    let current = progress.state.expect("wizard should still be running");
    scene::feed(current, Input::Callback(data), ctx).await
}

async fn type_text(progress: Progress<Scene>, text: &str, ctx: &StepContext) -> Progress<Scene> {
    let current = progress.state.expect("wizard should still be running");
    scene::feed(current, Input::Text(text), ctx).await
}

fn alert_step(progress: &Progress<Scene>) -> AlertStep {
    match &progress.state {
        Some(Scene::Alert(_, state)) => state.cursor,
        other => panic!("not in the alert wizard: {:?}", other),
    }
}

fn last_screen_text(progress: &Progress<Scene>) -> String {
    progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .map(|s| s.text.clone())
        .unwrap_or_default()
}

fn toasts(progress: &Progress<Scene>) -> Vec<String> {
    progress
        .replies
        .iter()
        .filter_map(|r| match r {
            Reply::Toast(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn discovery_alert(user_id: &str) -> NewAlert {
    NewAlert {
        user_id: user_id.to_string(),
        kind: AlertKind::Discovery,
        alert_type: AlertType::MarketTransition,
        coin_id: None,
        coin_name: None,
        watchlist_id: None,
        watchlist_name: None,
        threshold: None,
        timeframe: TimeFrame::D1,
        pairing: Pairing::Usd,
        message: None,
        indicators: Vec::new(),
        conditions: vec!["Bullish to Bearish".into()],
    }
}

#[tokio::test]
async fn test_watchlist_alert_end_to_end() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let watchlist = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();
    assert_eq!(watchlist.id, "watch1");

    let progress = start(SceneKind::Alert(AlertVariant::Create), &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Kind);

    let progress = press(progress, "select_alert_watchlist", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinSearch);

    // exact id match clears the wizard confidence threshold
    let progress = type_text(progress, "bitcoin", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Watchlist);
    assert!(toasts(&progress).iter().any(|t| t.contains("Bitcoin")));

    let progress = press(progress, &format!("select_watchlist_{}", watchlist.id), &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::AlertType);

    let progress = press(progress, "alert_type_PRICE_UP", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Threshold);

    let progress = type_text(progress, "50000", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Timeframe);

    let progress = press(progress, "timeframe_H12", &ctx).await;
    let progress = press(progress, "pairing_USD", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Message);

    let progress = press(progress, "message_skip", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Confirm);

    let progress = press(progress, "create_alert_confirm", &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Alerts));
    assert!(toasts(&progress).contains(&"Alert created for Bitcoin in Majors!".to_string()));

    let alerts = services.alerts.get_watchlist_alerts("42", Some("watch1")).await;
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(alert.alert_type, AlertType::PriceUp);
    assert_eq!(alert.threshold, Some(Decimal::from(50000)));
    assert_eq!(alert.timeframe, TimeFrame::H12);
    assert_eq!(alert.pairing, Pairing::Usd);
    assert_eq!(alert.coin_id.as_deref(), Some("bitcoin"));
}

#[tokio::test]
async fn test_go_back_restores_previous_screen() {
    let ctx = context(Arc::new(Services::in_memory()));

    let progress = start(SceneKind::Alert(AlertVariant::Create), &ctx).await;
    let progress = press(progress, "select_alert_discovery", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::AlertType);
    let type_screen = last_screen_text(&progress);

    let progress = press(progress, "alert_type_RSI_OVERBOUGHT", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Threshold);

    let progress = press(progress, "go_back", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::AlertType);
    assert_eq!(last_screen_text(&progress), type_screen);
    match &progress.state {
        Some(Scene::Alert(_, state)) => assert_eq!(state.params.alert_type, None),
        other => panic!("unexpected state {:?}", other),
    }

    let progress = press(progress, "go_back", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Kind);

    let progress = press(progress, "go_back", &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Alerts));
}

#[tokio::test]
async fn test_invalid_threshold_keeps_step() {
    let ctx = context(Arc::new(Services::in_memory()));

    let progress = start(SceneKind::Alert(AlertVariant::Create), &ctx).await;
    let progress = press(progress, "select_alert_discovery", &ctx).await;
    let progress = press(progress, "alert_type_RSI_OVERSOLD", &ctx).await;

    let progress = type_text(progress, "lots", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Threshold);
    assert_eq!(toasts(&progress).len(), 1);

    let progress = type_text(progress, "30", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Timeframe);
}

#[tokio::test]
async fn test_partial_query_lists_results() {
    let ctx = context(Arc::new(Services::in_memory()));

    let progress = start(SceneKind::Alert(AlertVariant::Discovery), &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinSearch);

    let progress = type_text(progress, "bit", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinResults);
    let buttons = progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .map(|s| s.callback_data())
        .unwrap_or_default();
    assert!(buttons.iter().any(|d| d.ends_with("bitcoin")));

    let select = buttons.iter().find(|d| d.ends_with("_bitcoin")).cloned().unwrap();
    let progress = press(progress, &select, &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::AlertType);

    // going back from the type step returns to the result list
    let progress = press(progress, "go_back", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinResults);
    let labels = progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .map(|s| s.labels())
        .unwrap_or_default();
    assert!(labels.iter().any(|l| l.contains("Bitcoin")));

    let progress = press(progress, "go_back", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinSearch);
}

#[tokio::test]
async fn test_retry_after_empty_search_returns_to_prompt() {
    let ctx = context(Arc::new(Services::in_memory()));

    let progress = start(SceneKind::Alert(AlertVariant::Discovery), &ctx).await;
    let prompt = last_screen_text(&progress);

    let progress = type_text(progress, "bit", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinResults);

    // a second query with no match replaces the list with a retry screen
    let progress = type_text(progress, "zzzz", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinResults);
    let retry = progress
        .replies
        .iter()
        .find_map(Reply::as_screen)
        .map(|s| s.callback_data())
        .unwrap_or_default();
    assert!(retry.contains(&"coinsearch_retry".to_string()));

    let progress = press(progress, "coinsearch_retry", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::CoinSearch);
    assert_eq!(last_screen_text(&progress), prompt);
    assert!(toasts(&progress).is_empty());
    match &progress.state {
        Some(Scene::Alert(_, state)) => assert_eq!(state.params.coin.search, None),
        other => panic!("unexpected state {:?}", other),
    }

    let progress = type_text(progress, "SOL", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::AlertType);
}

#[tokio::test]
async fn test_indicator_picker_enforces_limit() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let limit = services.alerts.limits().indicator_limit;

    let progress = start(SceneKind::Alert(AlertVariant::Discovery), &ctx).await;
    let progress = type_text(progress, "ethereum", &ctx).await;
    let mut progress = press(progress, "alert_type_LEVEL_BREAK", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Indicators);

    for name in ["RSI", "MACD", "Stochastic"].iter().take(limit) {
        progress = press(progress, &format!("indicator_picker_option_{}", name), &ctx).await;
    }
    let progress = press(progress, "indicator_picker_option_Ichimoku Cloud", &ctx).await;
    assert!(toasts(&progress).contains(&format!("Maximum {} options allowed", limit)));
    match &progress.state {
        Some(Scene::Alert(_, state)) => assert_eq!(state.params.indicators.selected.len(), limit),
        other => panic!("unexpected state {:?}", other),
    }

    let progress = press(progress, "indicator_picker_CHOOSE", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::PairTime);
}

#[tokio::test]
async fn test_discovery_limit_leaves_wizard() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let limit = services.alerts.limits().discovery_limit;
    for _ in 0..limit {
        services.alerts.create_alert(discovery_alert("42")).await.unwrap();
    }

    let progress = start(SceneKind::Alert(AlertVariant::MarketTransition), &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Condition);

    let progress = press(progress, "transition_type_Bearish to Bullish", &ctx).await;
    let progress = press(progress, "timeframe_D1", &ctx).await;
    let progress = press(progress, "pairing_BTC", &ctx).await;
    assert_eq!(alert_step(&progress), AlertStep::Confirm);

    let progress = press(progress, "create_transition_alert_confirm", &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Alerts));
    assert!(progress.replies.contains(&Reply::notice(format!(
        "You have reached the limit of {} discovery alerts.",
        limit
    ))));
    assert_eq!(services.alerts.get_discovery_alerts("42").await.len(), limit);
}

#[tokio::test]
async fn test_delete_alert_flow() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let alert = services.alerts.create_alert(discovery_alert("42")).await.unwrap();

    let progress = start(SceneKind::DeleteAlert(None), &ctx).await;
    let progress = press(progress, "select_type_discovery", &ctx).await;
    let progress = press(progress, &format!("select_alert_{}", alert.id), &ctx).await;
    let progress = press(progress, "delete_alert_confirm", &ctx).await;

    assert!(progress.is_finished());
    assert!(services.alerts.get_alert_by_id(&alert.id).await.is_none());
    assert!(!services.alerts.delete_alert(&alert.id).await);
}

#[tokio::test]
async fn test_unknown_coin_entry_returns_to_main_menu() {
    let ctx = context(Arc::new(Services::in_memory()));

    let progress = scene::start(Entry::from_callback("chart_not-a-coin").unwrap(), &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Main));
    assert_eq!(progress.replies, vec![Reply::notice("Coin not found.")]);
}

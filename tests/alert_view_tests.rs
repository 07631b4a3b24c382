use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;

use trendsniper_bot::bot::handlers::{CallbackHandler, Menu};
use trendsniper_bot::bot::BotContext;
use trendsniper_bot::components::Reply;
use trendsniper_bot::services::types::{AlertKind, AlertType, NewAlert, Pairing, TimeFrame};
use trendsniper_bot::services::Services;
use trendsniper_bot::utils::Config;
use trendsniper_bot::wizards::alert::AlertStep;
use trendsniper_bot::wizards::scene::{self, Entry, Scene, SceneKind};
use trendsniper_bot::wizards::{AlertVariant, Input, Progress, StepContext};

fn context(services: Arc<Services>) -> StepContext {
    StepContext::new(services, "42", Duration::from_secs(20))
}

fn screen_data(progress: &Progress<Scene>) -> Vec<String> {
    progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .map(|s| s.callback_data())
        .unwrap_or_default()
}

fn screen_text(progress: &Progress<Scene>) -> String {
    progress
        .replies
        .iter()
        .rev()
        .find_map(Reply::as_screen)
        .map(|s| s.text.clone())
        .unwrap_or_default()
}

async fn press(progress: Progress<Scene>, data: &str, ctx: &StepContext) -> Progress<Scene> {
    let current = progress.state.expect("wizard should still be running");
    scene::feed(current, Input::Callback(data), ctx).await
}

fn watchlist_alert(watchlist_id: &str, watchlist_name: &str, coin: &str) -> NewAlert {
    NewAlert {
        user_id: "42".into(),
        kind: AlertKind::Watchlist,
        alert_type: AlertType::PriceDown,
        coin_id: Some(coin.to_lowercase()),
        coin_name: Some(coin.into()),
        watchlist_id: Some(watchlist_id.into()),
        watchlist_name: Some(watchlist_name.into()),
        threshold: Some(Decimal::from(900)),
        timeframe: TimeFrame::H4,
        pairing: Pairing::Usd,
        message: None,
        indicators: Vec::new(),
        conditions: Vec::new(),
    }
}

fn discovery_alert() -> NewAlert {
    NewAlert {
        user_id: "42".into(),
        kind: AlertKind::Discovery,
        alert_type: AlertType::MarketTransition,
        coin_id: None,
        coin_name: None,
        watchlist_id: None,
        watchlist_name: None,
        threshold: None,
        timeframe: TimeFrame::D1,
        pairing: Pairing::Btc,
        message: None,
        indicators: Vec::new(),
        conditions: vec!["Bearish to Bullish".into()],
    }
}

#[tokio::test]
async fn test_watchlist_view_narrows_to_one_watchlist() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let majors = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();
    let defi = services.watchlists.create_watchlist("42", false, "DeFi").await.unwrap();
    services.alerts.create_alert(watchlist_alert(&majors.id, "Majors", "Bitcoin")).await.unwrap();
    services.alerts.create_alert(watchlist_alert(&defi.id, "DeFi", "Uniswap")).await.unwrap();

    let progress = scene::start(Entry::new(SceneKind::WatchlistAlerts), &ctx).await;
    let data = screen_data(&progress);
    assert_eq!(data[0], "all_watchlists");
    assert!(data.contains(&format!("select_watchlist_{}", defi.id)));

    let progress = press(progress, &format!("select_watchlist_{}", majors.id), &ctx).await;
    let text = screen_text(&progress);
    assert!(text.contains("Bitcoin"));
    assert!(!text.contains("Uniswap"));
    assert!(screen_data(&progress).contains(&format!("create_alert_in_{}", majors.id)));

    let progress = press(progress, "go_back", &ctx).await;
    let progress = press(progress, "all_watchlists", &ctx).await;
    let text = screen_text(&progress);
    assert!(text.contains("Bitcoin") && text.contains("Uniswap"));
    assert!(screen_data(&progress).contains(&"create_alert".to_string()));
}

#[tokio::test]
async fn test_scoped_create_skips_kind_and_watchlist() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let majors = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();

    let entry = Entry::from_callback(&format!("create_alert_in_{}", majors.id)).unwrap();
    let progress = scene::start(entry, &ctx).await;
    let step = |p: &Progress<Scene>| match &p.state {
        Some(Scene::Alert(_, state)) => state.cursor,
        other => panic!("not in the alert wizard: {:?}", other),
    };
    assert_eq!(step(&progress), AlertStep::CoinSearch);

    let current = progress.state.unwrap();
    let progress = scene::feed(current, Input::Text("bitcoin"), &ctx).await;
    assert_eq!(step(&progress), AlertStep::AlertType);

    let progress = press(progress, "alert_type_PRICE_UP", &ctx).await;
    let current = progress.state.unwrap();
    let progress = scene::feed(current, Input::Text("75000"), &ctx).await;
    let progress = press(progress, "timeframe_D1", &ctx).await;
    let progress = press(progress, "pairing_USD", &ctx).await;
    let progress = press(progress, "message_skip", &ctx).await;
    let progress = press(progress, "create_alert_confirm", &ctx).await;
    assert!(progress.is_finished());

    let alerts = services.alerts.get_watchlist_alerts("42", Some(&majors.id)).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].watchlist_name.as_deref(), Some("Majors"));
}

#[tokio::test]
async fn test_scoped_create_leaves_on_first_step() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let majors = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();

    let entry = Entry::for_watchlist(SceneKind::Alert(AlertVariant::Create), &majors.id);
    let progress = scene::start(entry, &ctx).await;
    let progress = press(progress, "go_back", &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Alerts));
}

#[tokio::test]
async fn test_scoped_create_rejects_foreign_watchlist() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let other = services.watchlists.create_watchlist("99", false, "Not Mine").await.unwrap();

    let entry = Entry::from_callback(&format!("create_alert_in_{}", other.id)).unwrap();
    let progress = scene::start(entry, &ctx).await;
    assert!(progress.is_finished());
    assert_eq!(progress.exit_to, Some(Menu::Alerts));
    assert_eq!(progress.replies, vec![Reply::notice("Watchlist not found.")]);
}

#[tokio::test]
async fn test_discovery_view_and_scoped_delete() {
    let services = Arc::new(Services::in_memory());
    let ctx = context(services.clone());
    let majors = services.watchlists.create_watchlist("42", false, "Majors").await.unwrap();
    let kept = services.alerts.create_alert(watchlist_alert(&majors.id, "Majors", "Bitcoin")).await.unwrap();
    let discovery = services.alerts.create_alert(discovery_alert()).await.unwrap();

    let progress = scene::start(Entry::new(SceneKind::DiscoveryAlerts), &ctx).await;
    assert!(screen_text(&progress).contains("Market Transition Alerts:"));
    assert!(screen_data(&progress).contains(&"delete_discovery_alerts".to_string()));

    // the delete entry skips the filter question and lists discovery alerts only
    let progress = scene::start(Entry::from_callback("delete_discovery_alerts").unwrap(), &ctx).await;
    let data = screen_data(&progress);
    assert!(data.contains(&format!("select_alert_{}", discovery.id)));
    assert!(!data.contains(&format!("select_alert_{}", kept.id)));

    let progress = press(progress, &format!("select_alert_{}", discovery.id), &ctx).await;
    let progress = press(progress, "delete_alert_confirm", &ctx).await;
    assert!(progress.is_finished());
    assert!(services.alerts.get_discovery_alerts("42").await.is_empty());
    assert!(services.alerts.get_alert_by_id(&kept.id).await.is_some());
}

#[tokio::test]
async fn test_view_buttons_switch_wizards() {
    let ctx = BotContext::new(
        Arc::new(Config::for_local("123456:TEST")),
        Arc::new(Services::in_memory()),
    );
    let chat = ChatId(1001);
    let majors = ctx.services.watchlists.create_watchlist("1001", false, "Majors").await.unwrap();

    CallbackHandler::route(&ctx, chat, "1001", "show_watchlist_alerts").await;
    assert_eq!(ctx.sessions.active(chat).await, Some("watchlist_alerts"));

    CallbackHandler::route(&ctx, chat, "1001", &format!("select_watchlist_{}", majors.id)).await;
    CallbackHandler::route(&ctx, chat, "1001", &format!("create_alert_in_{}", majors.id)).await;
    assert_eq!(ctx.sessions.active(chat).await, Some("create_alert"));
}

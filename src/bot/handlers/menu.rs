use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::components::{go_back_row, Screen};
use crate::errors::Result;
use crate::services::Services;
use crate::utils::{bold, escape_markdown};

/// Screens reachable outside of a wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    Main,
    Sub,
    Alerts,
    AlertSettings,
    Discover,
    Watchlists,
}

impl Menu {
    /// Menu opened by a fixed callback token.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "main_menu" => Some(Menu::Main),
            "sub_menu" => Some(Menu::Sub),
            "alerts_submenu" => Some(Menu::Alerts),
            "alert_settings" => Some(Menu::AlertSettings),
            "discover_submenu" => Some(Menu::Discover),
            "watchlist_submenu" => Some(Menu::Watchlists),
            _ => None,
        }
    }
}

/// Menu creator for all bot menus
pub struct MenuCreator;

impl MenuCreator {
    pub async fn render(menu: Menu, services: &Services, user_id: &str) -> Result<Screen> {
        Ok(match menu {
            Menu::Main => Self::create_main_menu(),
            Menu::Sub => Self::create_sub_menu(),
            Menu::Alerts => Self::create_alerts_menu(services, user_id).await,
            Menu::AlertSettings => Self::create_alert_settings(services),
            Menu::Discover => Self::create_discover_menu(),
            Menu::Watchlists => Self::create_watchlists_menu(services, user_id).await,
        })
    }

    pub fn create_main_menu() -> Screen {
        Screen::new(
            escape_markdown("Welcome to TrendSniper Bot!\nChoose an option:"),
            InlineKeyboardMarkup::new(vec![
                vec![
                    InlineKeyboardButton::callback("🔔 Alerts", "alerts_submenu"),
                    InlineKeyboardButton::callback("🔎 Discover", "discover_submenu"),
                ],
                vec![
                    InlineKeyboardButton::callback("⭐ Watchlists", "watchlist_submenu"),
                    InlineKeyboardButton::callback("📈 Chart", "charting_wizard"),
                ],
                vec![
                    InlineKeyboardButton::callback("Sub Menu", "sub_menu"),
                    InlineKeyboardButton::callback("Start Wizard", "start_wizard"),
                ],
            ]),
        )
    }

    pub fn create_sub_menu() -> Screen {
        Screen::new(
            "Sub Menu",
            InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("Start Wizard", "start_wizard")],
                go_back_row(),
            ]),
        )
    }

    async fn create_alerts_menu(services: &Services, user_id: &str) -> Screen {
        let summary = services.alerts.get_alerts_summary(user_id).await;
        let limits = services.alerts.limits();

        let text = format!(
            "🔔 {}\n\n{}\n\n{}\n{}\n\n{}",
            bold("Alerts Menu"),
            escape_markdown(&format!(
                "Total: {} | Active: {} | Watchlist: {} | Discovery: {}",
                summary.total_alerts, summary.active_alerts, summary.watchlist_alerts, summary.discovery_alerts
            )),
            bold("⬇️ Alert Limits:"),
            escape_markdown(&format!(
                "• Coin-Specific Alerts: {}/{} remaining\n• Watchlist Alerts: {}/{} remaining",
                summary.remaining.discovery,
                limits.discovery_limit,
                summary.remaining.watchlist,
                limits.watchlist_limit
            )),
            escape_markdown("Manage your cryptocurrency price and indicator alerts below:"),
        );

        Screen::new(
            text,
            InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("📋 Show All", "show_all_alerts")],
                vec![
                    InlineKeyboardButton::callback("⭐ Watchlist Alerts", "show_watchlist_alerts"),
                    InlineKeyboardButton::callback("🔎 Discovery Alerts", "show_discovery_alerts"),
                ],
                vec![
                    InlineKeyboardButton::callback("➕ Watchlist Alert", "create_alert"),
                    InlineKeyboardButton::callback("🔎 Discovery Alert", "create_discovery_alert"),
                ],
                vec![
                    InlineKeyboardButton::callback("🔄 Market Transitions", "create_market_transition_alert"),
                    InlineKeyboardButton::callback("📊 Level Breaks", "create_level_break_alert"),
                ],
                vec![
                    InlineKeyboardButton::callback("🗑️ Delete Alert", "delete_alert"),
                    InlineKeyboardButton::callback("🔧 Alert Settings", "alert_settings"),
                ],
                go_back_row(),
            ]),
        )
    }

    fn create_alert_settings(services: &Services) -> Screen {
        let limits = services.alerts.limits();
        let text = format!(
            "🔧 {}\n\n{}",
            bold("Alert Settings"),
            escape_markdown(&format!(
                "• Alerts per watchlist: {}\n• Discovery alerts: {}\n• Indicators per alert: {}\n• Price levels: {}\n\nFor custom alert requirements, please contact support.",
                limits.watchlist_limit, limits.discovery_limit, limits.indicator_limit, limits.price_level_limit
            )),
        );

        Screen::new(
            text,
            InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
                crate::constants::GO_BACK_LABEL,
                "alerts_submenu",
            )]]),
        )
    }

    pub fn create_discover_menu() -> Screen {
        Screen::new(
            format!(
                "🔎 {}\n\n{}",
                bold("Discover"),
                escape_markdown("Find trending coins and set up market-wide alerts:")
            ),
            InlineKeyboardMarkup::new(vec![
                vec![
                    InlineKeyboardButton::callback("🏆 Strength Analysis", "strength_wizard"),
                    InlineKeyboardButton::callback("🔄 Latest Signals", "latest_signals_wizard"),
                ],
                vec![InlineKeyboardButton::callback("🔔 Discovery Alert", "create_discovery_alert")],
                vec![
                    InlineKeyboardButton::callback("🔄 Market Transitions", "create_market_transition_alert"),
                    InlineKeyboardButton::callback("📊 Level Breaks", "create_level_break_alert"),
                ],
                go_back_row(),
            ]),
        )
    }

    async fn create_watchlists_menu(services: &Services, user_id: &str) -> Screen {
        let watchlists = services.watchlists.get_watchlists(user_id, false).await;

        let body = if watchlists.is_empty() {
            escape_markdown("You have no watchlists yet. Add a coin to create one.")
        } else {
            watchlists
                .iter()
                .map(|w| {
                    let coins = if w.coins.is_empty() {
                        "empty".to_string()
                    } else {
                        w.coins.join(", ")
                    };
                    format!("• {} {}", bold(&w.name), escape_markdown(&format!("({})", coins)))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut rows = vec![vec![InlineKeyboardButton::callback("➕ Add Coin", "add_coin")]];
        if !watchlists.is_empty() {
            rows.push(vec![InlineKeyboardButton::callback("🗑️ Delete Watchlist", "delete_watchlist")]);
        }
        rows.push(go_back_row());

        Screen::new(
            format!("⭐ {}\n\n{}", bold("Your Watchlists"), body),
            InlineKeyboardMarkup::new(rows),
        )
    }
}

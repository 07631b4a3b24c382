//! Alerts set on the user's watchlists, for one watchlist or all of them.

use async_trait::async_trait;
use indexmap::IndexMap;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::handlers::menu::Menu;
use crate::components::{go_back_row, parse_choice, Reply, Screen};
use crate::errors::Result;
use crate::services::types::Alert;
use crate::utils::{bold, escape_markdown};
use super::alert::WatchlistRef;
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

pub const WATCHLIST_ALERTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistAlertsStep {
    Select,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistScope {
    All,
    One(WatchlistRef),
}

impl WatchlistScope {
    fn watchlist_id(&self) -> Option<&str> {
        match self {
            WatchlistScope::All => None,
            WatchlistScope::One(w) => Some(w.id.as_str()),
        }
    }

    /// Entry token for creating an alert in this scope.
    fn create_token(&self) -> String {
        match self {
            WatchlistScope::All => "create_alert".to_string(),
            WatchlistScope::One(w) => format!("create_alert_in_{}", w.id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistAlertsParams {
    pub scope: Option<WatchlistScope>,
    /// One based.
    pub page: usize,
}

const STEPS: &[StepDecl<WatchlistAlertsStep, WatchlistAlertsParams>] = &[
    StepDecl { step: WatchlistAlertsStep::Select, when: always },
    StepDecl { step: WatchlistAlertsStep::List, when: always },
];

fn alert_line(alert: &Alert) -> String {
    format!(
        "• {} - {}: {} ({})",
        alert.coin_name.as_deref().or(alert.coin_id.as_deref()).unwrap_or("Unknown Coin"),
        alert.alert_type.display_name(),
        alert.threshold.map_or_else(|| "-".to_string(), |t| t.to_string()),
        alert.timeframe.display_name()
    )
}

pub struct WatchlistAlertsWizard;

impl WatchlistAlertsWizard {
    fn list_screen(scope: &WatchlistScope, alerts: &[Alert], page: usize, watchlist_limit: usize) -> Screen {
        if alerts.is_empty() {
            let text = match scope {
                WatchlistScope::All => "No watchlist alerts found.".to_string(),
                WatchlistScope::One(w) => format!("No alerts found for watchlist \"{}\".", w.name),
            };
            return Screen::new(
                escape_markdown(&text),
                InlineKeyboardMarkup::new(vec![
                    vec![InlineKeyboardButton::callback("➕ Create Alert", scope.create_token())],
                    go_back_row(),
                ]),
            );
        }

        let pages = alerts.len().div_ceil(WATCHLIST_ALERTS_PER_PAGE);
        let page = page.clamp(1, pages);
        let shown = alerts
            .iter()
            .skip((page - 1) * WATCHLIST_ALERTS_PER_PAGE)
            .take(WATCHLIST_ALERTS_PER_PAGE);

        let (heading, limit_line) = match scope {
            WatchlistScope::All => (
                "🔔 All Watchlist Alerts".to_string(),
                format!("Alert limit: {} per watchlist", watchlist_limit),
            ),
            WatchlistScope::One(w) => (
                format!("🔔 Alerts for \"{}\"", w.name),
                format!("Alert limit: {}/{} per watchlist", alerts.len(), watchlist_limit),
            ),
        };

        let mut body = vec![limit_line];
        if pages > 1 {
            body.push(format!("Page {} of {}", page, pages));
        }

        match scope {
            WatchlistScope::All => {
                let mut groups: IndexMap<&str, Vec<&Alert>> = IndexMap::new();
                for alert in shown {
                    let name = alert.watchlist_name.as_deref().unwrap_or("Unknown Watchlist");
                    groups.entry(name).or_default().push(alert);
                }
                for (name, group) in groups {
                    body.push(format!("{}:", name));
                    body.extend(group.into_iter().map(alert_line));
                }
            }
            WatchlistScope::One(_) => body.extend(shown.map(alert_line)),
        }

        let mut rows = vec![vec![
            InlineKeyboardButton::callback("➕ Add Alert", scope.create_token()),
            InlineKeyboardButton::callback("🗑️ Delete Alert", "delete_watchlist_alerts"),
        ]];

        let mut paging = Vec::new();
        if page > 1 {
            paging.push(InlineKeyboardButton::callback("◀️ Previous", format!("alerts_page_{}", page - 1)));
        }
        if page < pages {
            paging.push(InlineKeyboardButton::callback("Next ▶️", format!("alerts_page_{}", page + 1)));
        }
        if !paging.is_empty() {
            rows.push(paging);
        }
        rows.push(vec![InlineKeyboardButton::callback("🔄 Refresh", "refresh_alerts")]);
        rows.push(go_back_row());

        Screen::new(
            format!("{}\n\n{}", bold(&heading), escape_markdown(&body.join("\n"))),
            InlineKeyboardMarkup::new(rows),
        )
    }
}

#[async_trait]
impl Flow for WatchlistAlertsWizard {
    type Step = WatchlistAlertsStep;
    type Params = WatchlistAlertsParams;

    fn name(&self) -> &'static str {
        "watchlist_alerts"
    }

    fn steps(&self) -> &[StepDecl<WatchlistAlertsStep, WatchlistAlertsParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Alerts
    }

    fn clear(&self, step: WatchlistAlertsStep, params: &mut WatchlistAlertsParams) {
        match step {
            WatchlistAlertsStep::Select => params.scope = None,
            WatchlistAlertsStep::List => params.page = 0,
        }
    }

    async fn render(
        &self,
        step: WatchlistAlertsStep,
        params: &mut WatchlistAlertsParams,
        ctx: &StepContext,
    ) -> Result<Vec<Reply>> {
        let screen = match (step, params.scope.as_ref()) {
            (WatchlistAlertsStep::Select, _) => {
                let watchlists = ctx.services.watchlists.get_watchlists(&ctx.user_id, false).await;
                if watchlists.is_empty() {
                    Screen::new(
                        escape_markdown(
                            "You don't have any watchlists yet. Create a watchlist first to set alerts on it.",
                        ),
                        InlineKeyboardMarkup::new(vec![
                            vec![InlineKeyboardButton::callback("➕ Add Coin", "add_coin")],
                            go_back_row(),
                        ]),
                    )
                } else {
                    let mut rows = vec![vec![InlineKeyboardButton::callback("📊 All Watchlists", "all_watchlists")]];
                    rows.extend(watchlists.iter().map(|w| {
                        vec![InlineKeyboardButton::callback(
                            w.name.clone(),
                            format!("select_watchlist_{}", w.id),
                        )]
                    }));
                    rows.push(go_back_row());
                    Screen::new(
                        format!(
                            "📋 {}\n\n{}",
                            bold("Select a watchlist to view alerts:"),
                            escape_markdown("Or choose \"All Watchlists\" to see alerts across all your watchlists.")
                        ),
                        InlineKeyboardMarkup::new(rows),
                    )
                }
            }
            (WatchlistAlertsStep::List, Some(scope)) => {
                let alerts = ctx
                    .services
                    .alerts
                    .get_watchlist_alerts(&ctx.user_id, scope.watchlist_id())
                    .await;
                let limit = ctx.services.alerts.limits().watchlist_limit;
                Self::list_screen(scope, &alerts, params.page.max(1), limit)
            }
            (WatchlistAlertsStep::List, None) => Screen::new(
                escape_markdown("No watchlist selected."),
                InlineKeyboardMarkup::new(vec![go_back_row()]),
            ),
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: WatchlistAlertsStep,
        input: Input<'_>,
        params: &mut WatchlistAlertsParams,
        ctx: &StepContext,
    ) -> Result<Outcome<WatchlistAlertsStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };

        Ok(match step {
            WatchlistAlertsStep::Select => {
                if data == "all_watchlists" {
                    params.scope = Some(WatchlistScope::All);
                    params.page = 1;
                    Outcome::next()
                } else if let Some(id) = parse_choice("select_watchlist", data) {
                    match ctx.services.watchlists.get_watchlist_by_id(id).await {
                        Some(w) if w.telegram_id == ctx.user_id => {
                            params.scope = Some(WatchlistScope::One(WatchlistRef { id: w.id, name: w.name }));
                            params.page = 1;
                            Outcome::next()
                        }
                        _ => Outcome::toast("Watchlist not found"),
                    }
                } else {
                    Outcome::toast("Please pick a watchlist from the list.")
                }
            }
            WatchlistAlertsStep::List => {
                if let Some(page) = parse_choice("alerts_page", data).and_then(|p| p.parse::<usize>().ok()) {
                    params.page = page.max(1);
                    Outcome::redraw()
                } else if data == "refresh_alerts" {
                    Outcome::redraw().reply(Reply::toast("Alerts refreshed"))
                } else {
                    Outcome::toast("Please use the buttons above.")
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::types::{AlertKind, AlertStatus, AlertType, Pairing, TimeFrame};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn alert(n: usize, watchlist: &str) -> Alert {
        Alert {
            id: format!("alert_{}", n),
            user_id: "7".into(),
            kind: AlertKind::Watchlist,
            alert_type: AlertType::PriceUp,
            coin_id: Some("bitcoin".into()),
            coin_name: Some("Bitcoin".into()),
            watchlist_id: Some(format!("id_{}", watchlist)),
            watchlist_name: Some(watchlist.into()),
            threshold: Some(Decimal::from(100 + n)),
            timeframe: TimeFrame::D1,
            pairing: Pairing::Usd,
            message: None,
            indicators: Vec::new(),
            conditions: Vec::new(),
            status: AlertStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn majors() -> WatchlistScope {
        WatchlistScope::One(WatchlistRef { id: "watch1".into(), name: "Majors".into() })
    }

    #[test]
    fn test_all_watchlists_are_grouped() {
        let alerts = vec![alert(1, "Majors"), alert(2, "DeFi"), alert(3, "Majors")];
        let screen = WatchlistAlertsWizard::list_screen(&WatchlistScope::All, &alerts, 1, 10);

        let majors = screen.text.find("Majors:").unwrap();
        let defi = screen.text.find("DeFi:").unwrap();
        assert!(majors < defi);
        assert_eq!(screen.text.matches("Majors:").count(), 1);
        assert!(screen.callback_data().contains(&"create_alert".to_string()));
    }

    #[test]
    fn test_single_watchlist_uses_scoped_entries() {
        let alerts: Vec<Alert> = (1..=12).map(|n| alert(n, "Majors")).collect();
        let screen = WatchlistAlertsWizard::list_screen(&majors(), &alerts, 2, 10);
        let data = screen.callback_data();

        assert!(data.contains(&"create_alert_in_watch1".to_string()));
        assert!(data.contains(&"delete_watchlist_alerts".to_string()));
        assert!(data.contains(&"alerts_page_1".to_string()));
        assert!(!data.contains(&"alerts_page_3".to_string()));
        assert!(screen.text.contains("Page 2 of 2"));
        assert!(screen.text.contains("12/10"));
    }

    #[test]
    fn test_empty_watchlist_offers_create() {
        let screen = WatchlistAlertsWizard::list_screen(&majors(), &[], 1, 10);
        assert_eq!(screen.callback_data(), vec!["create_alert_in_watch1", "go_back"]);
        assert!(screen.text.contains("Majors"));
    }
}

//! Paged list of a user's alerts with pause/resume and delete.

use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{confirmation, go_back_row, parse_choice, Reply, Screen};
use crate::errors::Result;
use crate::services::types::Alert;
use crate::utils::{bold, escape_markdown};
use super::delete_alert::alert_label;
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

pub const ALERTS_PER_PAGE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStep {
    List,
    Detail,
    ConfirmDelete,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowserParams {
    /// Zero based.
    pub page: usize,
    pub selected: Option<Alert>,
}

const STEPS: &[StepDecl<BrowserStep, BrowserParams>] = &[
    StepDecl { step: BrowserStep::List, when: always },
    StepDecl { step: BrowserStep::Detail, when: always },
    StepDecl { step: BrowserStep::ConfirmDelete, when: always },
];

fn page_count(total: usize) -> usize {
    total.div_ceil(ALERTS_PER_PAGE).max(1)
}

pub struct AlertBrowser;

impl AlertBrowser {
    fn list_screen(alerts: &[Alert], page: usize) -> Screen {
        if alerts.is_empty() {
            return Screen::new(
                format!(
                    "📋 {}\n\n{}",
                    bold("Your Alerts"),
                    escape_markdown("You don't have any alerts yet.")
                ),
                InlineKeyboardMarkup::new(vec![
                    vec![InlineKeyboardButton::callback("➕ Create Alert", "create_alert")],
                    go_back_row(),
                ]),
            );
        }

        let pages = page_count(alerts.len());
        let mut rows: Vec<Vec<InlineKeyboardButton>> = alerts
            .iter()
            .skip(page * ALERTS_PER_PAGE)
            .take(ALERTS_PER_PAGE)
            .map(|a| {
                let marker = if a.is_active() { "🟢" } else { "⏸" };
                vec![InlineKeyboardButton::callback(
                    format!("{} {}", marker, alert_label(a)),
                    format!("view_alert_{}", a.id),
                )]
            })
            .collect();

        let mut paging = Vec::new();
        if page > 0 {
            paging.push(InlineKeyboardButton::callback("« Previous", format!("alerts_page_{}", page - 1)));
        }
        if page + 1 < pages {
            paging.push(InlineKeyboardButton::callback("Next »", format!("alerts_page_{}", page + 1)));
        }
        if !paging.is_empty() {
            rows.push(paging);
        }
        rows.push(vec![InlineKeyboardButton::callback("🔄 Refresh", "refresh_alerts")]);
        rows.push(go_back_row());

        Screen::new(
            format!(
                "📋 {}\n\n{}",
                bold("Your Alerts"),
                escape_markdown(&format!("{} alerts, page {} of {}", alerts.len(), page + 1, pages))
            ),
            InlineKeyboardMarkup::new(rows),
        )
    }

    fn detail_screen(alert: &Alert) -> Screen {
        let toggle = if alert.is_active() { "⏸ Pause" } else { "▶️ Resume" };
        Screen::new(
            format!(
                "🔔 {}\n\n{}",
                bold(&format!("Alert {}", alert.id)),
                escape_markdown(&alert.summary_lines().join("\n"))
            ),
            InlineKeyboardMarkup::new(vec![
                vec![
                    InlineKeyboardButton::callback(toggle, format!("toggle_alert_{}", alert.id)),
                    InlineKeyboardButton::callback("🗑️ Delete", format!("delete_alert_{}", alert.id)),
                ],
                go_back_row(),
            ]),
        )
    }
}

#[async_trait]
impl Flow for AlertBrowser {
    type Step = BrowserStep;
    type Params = BrowserParams;

    fn name(&self) -> &'static str {
        "alert_browser"
    }

    fn steps(&self) -> &[StepDecl<BrowserStep, BrowserParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Alerts
    }

    fn clear(&self, step: BrowserStep, params: &mut BrowserParams) {
        if step == BrowserStep::List {
            params.selected = None;
        }
    }

    async fn render(&self, step: BrowserStep, params: &mut BrowserParams, ctx: &StepContext) -> Result<Vec<Reply>> {
        let screen = match (step, params.selected.as_ref()) {
            (BrowserStep::List, _) => {
                let alerts = ctx.services.alerts.get_alerts(&ctx.user_id, None).await;
                params.page = params.page.min(page_count(alerts.len()) - 1);
                Self::list_screen(&alerts, params.page)
            }
            (BrowserStep::Detail, Some(alert)) => Self::detail_screen(alert),
            (BrowserStep::ConfirmDelete, Some(alert)) => confirmation(
                format!(
                    "⚠️ {}\n\n{}",
                    bold("Delete this alert?"),
                    escape_markdown(&alert.summary_lines().join("\n"))
                ),
                "🗑️ Delete",
                &format!("confirm_delete_alert_{}", alert.id),
            ),
            (_, None) => Screen::new(
                escape_markdown("That alert is no longer available."),
                InlineKeyboardMarkup::new(vec![go_back_row()]),
            ),
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: BrowserStep,
        input: Input<'_>,
        params: &mut BrowserParams,
        ctx: &StepContext,
    ) -> Result<Outcome<BrowserStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };
        let alerts = &ctx.services.alerts;

        Ok(match step {
            BrowserStep::List => {
                if data == "refresh_alerts" {
                    Outcome::redraw().reply(Reply::toast("Alerts refreshed"))
                } else if let Some(page) = parse_choice("alerts_page", data).and_then(|p| p.parse().ok()) {
                    params.page = page;
                    Outcome::redraw()
                } else if let Some(id) = parse_choice("view_alert", data) {
                    match alerts.get_alert_by_id(id).await {
                        Some(alert) if alert.user_id == ctx.user_id => {
                            params.selected = Some(alert);
                            Outcome::next()
                        }
                        _ => Outcome::redraw().reply(Reply::toast("Alert not found")),
                    }
                } else {
                    Outcome::toast("Please use the buttons above.")
                }
            }
            BrowserStep::Detail => {
                if let Some(id) = parse_choice("toggle_alert", data) {
                    match alerts.toggle_alert_status(id).await {
                        Some(alert) => {
                            let toast = if alert.is_active() { "Alert activated" } else { "Alert paused" };
                            params.selected = Some(alert);
                            Outcome::redraw().reply(Reply::toast(toast))
                        }
                        None => Outcome::goto(BrowserStep::List).reply(Reply::toast("Alert not found")),
                    }
                } else if parse_choice("delete_alert", data).is_some() {
                    Outcome::next()
                } else {
                    Outcome::toast("Please use the buttons above.")
                }
            }
            BrowserStep::ConfirmDelete => match parse_choice("confirm_delete_alert", data) {
                Some(id) => {
                    let deleted = alerts.delete_alert(id).await;
                    info!("User {} deleted alert {} from the browser: {}", ctx.user_id, id, deleted);
                    params.selected = None;
                    let toast = if deleted { "Alert deleted" } else { "Alert not found" };
                    Outcome::goto(BrowserStep::List).reply(Reply::toast(toast))
                }
                None => Outcome::toast("Please confirm or go back."),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(5), 1);
        assert_eq!(page_count(6), 2);
    }

    #[test]
    fn test_empty_list_offers_create() {
        let screen = AlertBrowser::list_screen(&[], 0);
        assert_eq!(screen.callback_data(), vec!["create_alert", "go_back"]);
    }
}

use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{confirmation, go_back_row, parse_choice, Reply, Screen};
use crate::constants::ALERT_LABEL_MAX_LEN;
use crate::errors::Result;
use crate::services::types::{Alert, AlertKind};
use crate::utils::{bold, escape_markdown, truncate_string};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const CONFIRM_DATA: &str = "delete_alert_confirm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAlertStep {
    Filter,
    Select,
    Confirm,
}

/// Which alerts the user wants to browse for deletion. `None` kind means all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertFilter(pub Option<AlertKind>);

impl AlertFilter {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "watchlist" => Some(Self(Some(AlertKind::Watchlist))),
            "discovery" => Some(Self(Some(AlertKind::Discovery))),
            "all" => Some(Self(None)),
            _ => None,
        }
    }

    fn empty_message(&self) -> &'static str {
        match self.0 {
            Some(AlertKind::Watchlist) => "You don't have any watchlist alerts to delete.",
            Some(AlertKind::Discovery) => "You don't have any discovery alerts to delete.",
            None => "You don't have any alerts to delete.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteAlertParams {
    pub filter: Option<AlertFilter>,
    /// The filter came with the entry and is not asked for.
    pub filter_locked: bool,
    pub alert: Option<Alert>,
}

impl DeleteAlertParams {
    pub fn for_kind(kind: AlertKind) -> Self {
        Self {
            filter: Some(AlertFilter(Some(kind))),
            filter_locked: true,
            alert: None,
        }
    }
}

fn asks_filter(p: &DeleteAlertParams) -> bool {
    !p.filter_locked
}

const STEPS: &[StepDecl<DeleteAlertStep, DeleteAlertParams>] = &[
    StepDecl { step: DeleteAlertStep::Filter, when: asks_filter },
    StepDecl { step: DeleteAlertStep::Select, when: always },
    StepDecl { step: DeleteAlertStep::Confirm, when: always },
];

/// List label for an alert, short enough for a button.
pub fn alert_label(alert: &Alert) -> String {
    truncate_string(
        &format!("{} • {}", alert.alert_type.display_name(), alert.subject()),
        ALERT_LABEL_MAX_LEN,
    )
}

pub struct DeleteAlertWizard;

impl DeleteAlertWizard {
    async fn candidates(params: &DeleteAlertParams, ctx: &StepContext) -> Vec<Alert> {
        let kind = params.filter.and_then(|f| f.0);
        ctx.services.alerts.get_alerts(&ctx.user_id, kind).await
    }
}

#[async_trait]
impl Flow for DeleteAlertWizard {
    type Step = DeleteAlertStep;
    type Params = DeleteAlertParams;

    fn name(&self) -> &'static str {
        "delete_alert"
    }

    fn steps(&self) -> &[StepDecl<DeleteAlertStep, DeleteAlertParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Alerts
    }

    fn clear(&self, step: DeleteAlertStep, params: &mut DeleteAlertParams) {
        match step {
            DeleteAlertStep::Filter => params.filter = None,
            DeleteAlertStep::Select => params.alert = None,
            DeleteAlertStep::Confirm => {}
        }
    }

    async fn render(
        &self,
        step: DeleteAlertStep,
        params: &mut DeleteAlertParams,
        ctx: &StepContext,
    ) -> Result<Vec<Reply>> {
        let screen = match step {
            DeleteAlertStep::Filter => Screen::new(
                format!(
                    "🗑️ {}\n\n{}",
                    bold("Delete Alert"),
                    escape_markdown("Which alerts do you want to look through?")
                ),
                InlineKeyboardMarkup::new(vec![
                    vec![
                        InlineKeyboardButton::callback("📋 Watchlist", "select_type_watchlist"),
                        InlineKeyboardButton::callback("🔎 Discovery", "select_type_discovery"),
                    ],
                    vec![InlineKeyboardButton::callback("All Alerts", "select_type_all")],
                    go_back_row(),
                ]),
            ),
            DeleteAlertStep::Select => {
                let alerts = Self::candidates(params, ctx).await;
                if alerts.is_empty() {
                    let message = params.filter.unwrap_or(AlertFilter(None)).empty_message();
                    Screen::new(
                        escape_markdown(message),
                        InlineKeyboardMarkup::new(vec![go_back_row()]),
                    )
                } else {
                    let mut rows: Vec<Vec<InlineKeyboardButton>> = alerts
                        .iter()
                        .map(|a| {
                            vec![InlineKeyboardButton::callback(
                                alert_label(a),
                                format!("select_alert_{}", a.id),
                            )]
                        })
                        .collect();
                    rows.push(go_back_row());
                    Screen::new(
                        escape_markdown("Select the alert to delete:"),
                        InlineKeyboardMarkup::new(rows),
                    )
                }
            }
            DeleteAlertStep::Confirm => {
                let details = params
                    .alert
                    .as_ref()
                    .map(|a| a.summary_lines().join("\n"))
                    .unwrap_or_default();
                confirmation(
                    format!(
                        "⚠️ {}\n\n{}",
                        bold("Delete this alert?"),
                        escape_markdown(&format!("{}\n\nThis cannot be undone.", details))
                    ),
                    "🗑️ Delete",
                    CONFIRM_DATA,
                )
            }
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: DeleteAlertStep,
        input: Input<'_>,
        params: &mut DeleteAlertParams,
        ctx: &StepContext,
    ) -> Result<Outcome<DeleteAlertStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };

        Ok(match step {
            DeleteAlertStep::Filter => match parse_choice("select_type", data).and_then(AlertFilter::from_token) {
                Some(filter) => {
                    params.filter = Some(filter);
                    Outcome::next()
                }
                None => Outcome::toast("Please choose which alerts to show."),
            },
            DeleteAlertStep::Select => {
                let Some(id) = parse_choice("select_alert", data) else {
                    return Ok(Outcome::toast("Please pick an alert from the list."));
                };
                match ctx.services.alerts.get_alert_by_id(id).await {
                    Some(alert) if alert.user_id == ctx.user_id => {
                        params.alert = Some(alert);
                        Outcome::next()
                    }
                    _ => Outcome::redraw().reply(Reply::notice("Alert not found or already deleted.")),
                }
            }
            DeleteAlertStep::Confirm => {
                if data != CONFIRM_DATA {
                    return Ok(Outcome::toast("Please confirm or go back."));
                }
                let Some(alert) = params.alert.as_ref() else {
                    return Ok(Outcome::leave().reply(Reply::notice("No alert selected.")));
                };
                if ctx.services.alerts.delete_alert(&alert.id).await {
                    info!("User {} deleted alert {}", ctx.user_id, alert.id);
                    Outcome::leave().reply(Reply::toast("Alert deleted successfully"))
                } else {
                    Outcome::leave().reply(Reply::notice("Alert not found or already deleted."))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::types::{AlertStatus, AlertType, Pairing, TimeFrame};
    use chrono::Utc;

    #[test]
    fn test_filter_tokens() {
        assert_eq!(AlertFilter::from_token("all"), Some(AlertFilter(None)));
        assert_eq!(
            AlertFilter::from_token("discovery"),
            Some(AlertFilter(Some(AlertKind::Discovery)))
        );
        assert_eq!(AlertFilter::from_token("other"), None);
    }

    #[test]
    fn test_alert_label_is_truncated() {
        let alert = Alert {
            id: "alert_1".into(),
            user_id: "7".into(),
            kind: AlertKind::Watchlist,
            alert_type: AlertType::PricePercentageDown,
            coin_id: Some("wrapped-bitcoin".into()),
            coin_name: Some("Wrapped Bitcoin".into()),
            watchlist_id: Some("watch1".into()),
            watchlist_name: Some("Long Term Holdings".into()),
            threshold: None,
            timeframe: TimeFrame::D1,
            pairing: Pairing::Usd,
            message: None,
            indicators: Vec::new(),
            conditions: Vec::new(),
            status: AlertStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let label = alert_label(&alert);
        assert_eq!(label.chars().count(), ALERT_LABEL_MAX_LEN);
        assert!(label.ends_with("..."));
    }
}

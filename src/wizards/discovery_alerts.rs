use async_trait::async_trait;
use indexmap::IndexMap;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::handlers::menu::Menu;
use crate::components::{go_back_row, Reply, Screen};
use crate::errors::Result;
use crate::services::types::Alert;
use crate::utils::{bold, escape_markdown};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryAlertsStep {
    Overview,
}

const STEPS: &[StepDecl<DiscoveryAlertsStep, ()>] = &[StepDecl { step: DiscoveryAlertsStep::Overview, when: always }];

/// Read-only overview of discovery alerts, grouped by alert type.
pub struct DiscoveryAlertsWizard;

impl DiscoveryAlertsWizard {
    fn overview_screen(alerts: &[Alert], discovery_limit: usize) -> Screen {
        if alerts.is_empty() {
            return Screen::new(
                escape_markdown(
                    "You don't have any discovery alerts yet. Discovery alerts help you find new opportunities based on technical indicators and market conditions.",
                ),
                InlineKeyboardMarkup::new(vec![
                    vec![InlineKeyboardButton::callback("➕ Create Discovery Alert", "create_discovery_alert")],
                    go_back_row(),
                ]),
            );
        }

        let mut groups: IndexMap<&str, Vec<&Alert>> = IndexMap::new();
        for alert in alerts {
            groups.entry(alert.alert_type.display_name()).or_default().push(alert);
        }

        let mut body = vec![format!("Alert limit: {}/{} discovery alerts", alerts.len(), discovery_limit)];
        for (type_name, group) in groups {
            body.push(String::new());
            body.push(format!("{} Alerts:", type_name));
            for alert in group {
                body.push(format!(
                    "• {} {} ({})",
                    alert.subject(),
                    alert.timeframe.display_name(),
                    alert.pairing
                ));
                if !alert.indicators.is_empty() {
                    body.push(format!("  Indicators: {}", alert.indicators.join(", ")));
                }
                if !alert.conditions.is_empty() {
                    body.push(format!("  Conditions: {}", alert.conditions.join(", ")));
                }
                if let Some(message) = &alert.message {
                    body.push(format!("  Message: \"{}\"", message));
                }
            }
        }

        Screen::new(
            format!("🔎 {}\n\n{}", bold("Your Discovery Alerts"), escape_markdown(&body.join("\n"))),
            InlineKeyboardMarkup::new(vec![
                vec![
                    InlineKeyboardButton::callback("➕ Add Discovery Alert", "create_discovery_alert"),
                    InlineKeyboardButton::callback("🗑️ Delete Alert", "delete_discovery_alerts"),
                ],
                go_back_row(),
            ]),
        )
    }
}

#[async_trait]
impl Flow for DiscoveryAlertsWizard {
    type Step = DiscoveryAlertsStep;
    type Params = ();

    fn name(&self) -> &'static str {
        "discovery_alerts"
    }

    fn steps(&self) -> &[StepDecl<DiscoveryAlertsStep, ()>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Alerts
    }

    fn clear(&self, _step: DiscoveryAlertsStep, _params: &mut ()) {}

    async fn render(&self, _step: DiscoveryAlertsStep, _params: &mut (), ctx: &StepContext) -> Result<Vec<Reply>> {
        let alerts = ctx.services.alerts.get_discovery_alerts(&ctx.user_id).await;
        let limit = ctx.services.alerts.limits().discovery_limit;
        Ok(vec![Self::overview_screen(&alerts, limit).into()])
    }

    async fn handle(
        &self,
        _step: DiscoveryAlertsStep,
        _input: Input<'_>,
        _params: &mut (),
        _ctx: &StepContext,
    ) -> Result<Outcome<DiscoveryAlertsStep>> {
        // Create and delete buttons are wizard entries and never reach here
        Ok(Outcome::toast("Please use the buttons above."))
    }
}

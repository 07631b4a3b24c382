//! Alert creation flows. One wizard type drives four step tables.

use async_trait::async_trait;
use rust_decimal::Decimal;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::info;

use crate::bot::handlers::menu::Menu;
use crate::components::{
    confirmation, go_back_row, parse_choice, picker, MultiPicker, MultiPickerOutcome, MultiPickerState,
    PairTimePicker, PairTimeState, Reply, Screen,
};
use crate::errors::{BotError, Result};
use crate::services::types::{AlertKind, AlertType, NewAlert, OptionsKind, Pairing, TimeFrame};
use crate::utils::{bold, escape_markdown, Validator};
use super::coin_steps::{self, CoinSelection};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

const INDICATOR_PREFIX: &str = "indicator_picker";
const TRANSITION_PREFIX: &str = "transition_picker";
const PAIR_TIME_PREFIX: &str = "cmbpicker";
const ALERT_TIMEFRAMES: [TimeFrame; 6] = [
    TimeFrame::H1,
    TimeFrame::H4,
    TimeFrame::H6,
    TimeFrame::H12,
    TimeFrame::D1,
    TimeFrame::W1,
];
const ALERT_PAIRINGS: [Pairing; 3] = [Pairing::Usd, Pairing::Btc, Pairing::Eth];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStep {
    Kind,
    CoinSearch,
    CoinResults,
    Watchlist,
    AlertType,
    Condition,
    Indicators,
    Transitions,
    PairTime,
    Threshold,
    Timeframe,
    Pairing,
    Message,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertVariant {
    Create,
    Discovery,
    MarketTransition,
    LevelBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertParams {
    pub kind: Option<AlertKind>,
    pub coin: CoinSelection,
    pub watchlist: Option<WatchlistRef>,
    /// Set when the wizard was opened from a watchlist, which fixes kind and watchlist.
    pub watchlist_locked: bool,
    pub alert_type: Option<AlertType>,
    pub condition: Option<String>,
    pub indicators: MultiPickerState,
    pub transitions: MultiPickerState,
    pub pair_time: PairTimeState,
    pub threshold: Option<Decimal>,
    pub timeframe: Option<TimeFrame>,
    pub pairing: Option<Pairing>,
    pub message: Option<String>,
}

fn on_watchlist_path(p: &AlertParams) -> bool {
    p.kind == Some(AlertKind::Watchlist)
}

fn picks_kind(p: &AlertParams) -> bool {
    !p.watchlist_locked
}

fn picks_watchlist(p: &AlertParams) -> bool {
    on_watchlist_path(p) && !p.watchlist_locked
}

fn watchlist_results(p: &AlertParams) -> bool {
    on_watchlist_path(p) && p.coin.shows_results()
}

fn shows_results(p: &AlertParams) -> bool {
    p.coin.shows_results()
}

fn is_market_transition(p: &AlertParams) -> bool {
    p.alert_type == Some(AlertType::MarketTransition)
}

const CREATE_STEPS: &[StepDecl<AlertStep, AlertParams>] = &[
    StepDecl { step: AlertStep::Kind, when: picks_kind },
    StepDecl { step: AlertStep::CoinSearch, when: on_watchlist_path },
    StepDecl { step: AlertStep::CoinResults, when: watchlist_results },
    StepDecl { step: AlertStep::Watchlist, when: picks_watchlist },
    StepDecl { step: AlertStep::AlertType, when: always },
    StepDecl { step: AlertStep::Threshold, when: always },
    StepDecl { step: AlertStep::Timeframe, when: always },
    StepDecl { step: AlertStep::Pairing, when: always },
    StepDecl { step: AlertStep::Message, when: always },
    StepDecl { step: AlertStep::Confirm, when: always },
];

const DISCOVERY_STEPS: &[StepDecl<AlertStep, AlertParams>] = &[
    StepDecl { step: AlertStep::CoinSearch, when: always },
    StepDecl { step: AlertStep::CoinResults, when: shows_results },
    StepDecl { step: AlertStep::AlertType, when: always },
    StepDecl { step: AlertStep::Indicators, when: always },
    StepDecl { step: AlertStep::Transitions, when: is_market_transition },
    StepDecl { step: AlertStep::PairTime, when: always },
    StepDecl { step: AlertStep::Confirm, when: always },
];

const CONDITION_STEPS: &[StepDecl<AlertStep, AlertParams>] = &[
    StepDecl { step: AlertStep::Condition, when: always },
    StepDecl { step: AlertStep::Timeframe, when: always },
    StepDecl { step: AlertStep::Pairing, when: always },
    StepDecl { step: AlertStep::Confirm, when: always },
];

/// Alert creation wizard for one [`AlertVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWizard {
    variant: AlertVariant,
}

impl AlertWizard {
    pub fn new(variant: AlertVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> AlertVariant {
        self.variant
    }

    pub fn initial_params(&self) -> AlertParams {
        let mut params = AlertParams::default();
        match self.variant {
            AlertVariant::Create => {}
            AlertVariant::Discovery => params.kind = Some(AlertKind::Discovery),
            AlertVariant::MarketTransition => {
                params.kind = Some(AlertKind::Discovery);
                params.alert_type = Some(AlertType::MarketTransition);
            }
            AlertVariant::LevelBreak => {
                params.kind = Some(AlertKind::Discovery);
                params.alert_type = Some(AlertType::LevelBreak);
            }
        }
        params
    }

    /// Watchlist alert for a watchlist chosen before the wizard started.
    pub fn watchlist_params(watchlist: WatchlistRef) -> AlertParams {
        AlertParams {
            kind: Some(AlertKind::Watchlist),
            watchlist: Some(watchlist),
            watchlist_locked: true,
            ..AlertParams::default()
        }
    }

    fn title(&self) -> &'static str {
        match self.variant {
            AlertVariant::Create => "Create New Alert",
            AlertVariant::Discovery => "Discovery Alert",
            AlertVariant::MarketTransition => "Market Transition Alert",
            AlertVariant::LevelBreak => "Level Break Alert",
        }
    }

    fn confirm_data(&self) -> &'static str {
        match self.variant {
            AlertVariant::Create => "create_alert_confirm",
            AlertVariant::Discovery => "create_discovery_alert_confirm",
            AlertVariant::MarketTransition => "create_transition_alert_confirm",
            AlertVariant::LevelBreak => "create_level_break_confirm",
        }
    }

    /// Callback prefix and option list of the condition step.
    fn condition_source(&self) -> (&'static str, OptionsKind) {
        match self.variant {
            AlertVariant::LevelBreak => ("break_type", OptionsKind::LevelBreaks),
            _ => ("transition_type", OptionsKind::MarketTransitions),
        }
    }

    fn alert_types(&self, params: &AlertParams) -> &'static [AlertType] {
        match (self.variant, params.kind) {
            (AlertVariant::Create, Some(AlertKind::Discovery)) => &AlertType::INDICATOR,
            (AlertVariant::Create, _) => &AlertType::WATCHLIST,
            _ => &AlertType::DISCOVERY,
        }
    }

    fn heading(&self, text: &str) -> String {
        format!("🔔 {}\n\n{}", bold(self.title()), escape_markdown(text))
    }

    async fn indicator_options(ctx: &StepContext) -> Vec<String> {
        ctx.services.options.get_options(OptionsKind::Indicators).await
    }

    async fn transition_options(ctx: &StepContext) -> Vec<String> {
        ctx.services.options.get_options(OptionsKind::MarketTransitions).await
    }

    fn summary(&self, params: &AlertParams) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(coin) = &params.coin.coin {
            lines.push(format!("Coin: {} ({})", coin.name, coin.symbol));
        }
        if let Some(watchlist) = &params.watchlist {
            lines.push(format!("Watchlist: {}", watchlist.name));
        }
        if let Some(alert_type) = params.alert_type {
            lines.push(format!("Type: {}", alert_type.display_name()));
        }
        if let Some(condition) = &params.condition {
            lines.push(format!("Condition: {}", condition));
        }
        if !params.indicators.selected.is_empty() {
            lines.push(format!("Indicators: {}", params.indicators.selected.join(", ")));
        }
        if !params.transitions.selected.is_empty() {
            lines.push(format!("Transitions: {}", params.transitions.selected.join(", ")));
        }
        if let Some(threshold) = params.threshold {
            lines.push(format!("Threshold: {}", threshold));
        }
        let (timeframe, pairing) = self.timeframe_and_pairing(params);
        if let Some(timeframe) = timeframe {
            lines.push(format!("Timeframe: {}", timeframe.display_name()));
        }
        if let Some(pairing) = pairing {
            lines.push(format!("Pairing: {}", pairing));
        }
        if let Some(message) = &params.message {
            lines.push(format!("Message: \"{}\"", message));
        }
        lines
    }

    fn timeframe_and_pairing(&self, params: &AlertParams) -> (Option<TimeFrame>, Option<Pairing>) {
        match self.variant {
            AlertVariant::Discovery => (Some(params.pair_time.timeframe), Some(params.pair_time.pairing)),
            _ => (params.timeframe, params.pairing),
        }
    }

    fn new_alert(&self, params: &AlertParams, user_id: &str) -> Result<NewAlert> {
        let missing = || BotError::validation("Missing required alert parameters.");
        let kind = params.kind.ok_or_else(missing)?;
        let alert_type = params.alert_type.ok_or_else(missing)?;
        let (timeframe, pairing) = self.timeframe_and_pairing(params);

        let (watchlist_id, watchlist_name) = match &params.watchlist {
            Some(w) => (Some(w.id.clone()), Some(w.name.clone())),
            None => (None, None),
        };
        let conditions = match self.variant {
            AlertVariant::Discovery => params.transitions.selected.clone(),
            _ => params.condition.iter().cloned().collect(),
        };

        if self.variant == AlertVariant::Create && params.threshold.is_none() {
            return Err(missing());
        }
        if kind == AlertKind::Watchlist && (params.coin.coin.is_none() || watchlist_id.is_none()) {
            return Err(missing());
        }

        Ok(NewAlert {
            user_id: user_id.to_string(),
            kind,
            alert_type,
            coin_id: params.coin.coin.as_ref().map(|c| c.id.clone()),
            coin_name: params.coin.coin.as_ref().map(|c| c.name.clone()),
            watchlist_id,
            watchlist_name,
            threshold: params.threshold,
            timeframe: timeframe.ok_or_else(missing)?,
            pairing: pairing.ok_or_else(missing)?,
            message: params.message.clone(),
            indicators: params.indicators.selected.clone(),
            conditions,
        })
    }

    fn success_message(&self, params: &AlertParams) -> String {
        match (self.variant, params.kind) {
            (AlertVariant::Create, Some(AlertKind::Watchlist)) => format!(
                "Alert created for {} in {}!",
                params.coin.coin_name(),
                params.watchlist.as_ref().map_or("your watchlist", |w| w.name.as_str())
            ),
            (AlertVariant::MarketTransition | AlertVariant::LevelBreak, _) => format!(
                "{} created for {}!",
                self.title(),
                params.condition.as_deref().unwrap_or("your selection")
            ),
            _ => format!(
                "Discovery Alert created for {}!",
                params.alert_type.map_or("your selection", |t| t.display_name())
            ),
        }
    }

    fn apply_multi_pick(outcome: MultiPickerOutcome, state: &mut MultiPickerState) -> Outcome<AlertStep> {
        *state = outcome.state;
        let next = if outcome.proceed {
            Outcome::next()
        } else if outcome.redraw {
            Outcome::redraw()
        } else {
            Outcome::hold()
        };
        match outcome.notice {
            Some(notice) => next.reply(Reply::toast(notice)),
            None => next,
        }
    }
}

fn use_buttons() -> Outcome<AlertStep> {
    Outcome::toast("Please use the buttons above.")
}

#[async_trait]
impl Flow for AlertWizard {
    type Step = AlertStep;
    type Params = AlertParams;

    fn name(&self) -> &'static str {
        match self.variant {
            AlertVariant::Create => "create_alert",
            AlertVariant::Discovery => "discovery_alert",
            AlertVariant::MarketTransition => "market_transition_alert",
            AlertVariant::LevelBreak => "level_break_alert",
        }
    }

    fn steps(&self) -> &[StepDecl<AlertStep, AlertParams>] {
        match self.variant {
            AlertVariant::Create => CREATE_STEPS,
            AlertVariant::Discovery => DISCOVERY_STEPS,
            AlertVariant::MarketTransition | AlertVariant::LevelBreak => CONDITION_STEPS,
        }
    }

    fn parent(&self) -> Menu {
        Menu::Alerts
    }

    fn clear(&self, step: AlertStep, params: &mut AlertParams) {
        match step {
            AlertStep::Kind => params.kind = None,
            AlertStep::CoinSearch => params.coin.clear(),
            AlertStep::CoinResults => params.coin.coin = None,
            AlertStep::Watchlist => params.watchlist = None,
            AlertStep::AlertType => params.alert_type = None,
            AlertStep::Condition => params.condition = None,
            AlertStep::Indicators => params.indicators = MultiPickerState::default(),
            AlertStep::Transitions => params.transitions = MultiPickerState::default(),
            AlertStep::PairTime => params.pair_time = PairTimeState::default(),
            AlertStep::Threshold => params.threshold = None,
            AlertStep::Timeframe => params.timeframe = None,
            AlertStep::Pairing => params.pairing = None,
            AlertStep::Message => params.message = None,
            AlertStep::Confirm => {}
        }
    }

    async fn render(&self, step: AlertStep, params: &mut AlertParams, ctx: &StepContext) -> Result<Vec<Reply>> {
        let screen = match step {
            AlertStep::Kind => Screen::new(
                self.heading("What type of alert would you like to create?"),
                InlineKeyboardMarkup::new(vec![
                    vec![
                        InlineKeyboardButton::callback("📋 Watchlist Alert", "select_alert_watchlist"),
                        InlineKeyboardButton::callback("🔎 Discovery Alert", "select_alert_discovery"),
                    ],
                    go_back_row(),
                ]),
            ),
            AlertStep::CoinSearch => return Ok(coin_steps::render_search("Search for a coin")),
            AlertStep::CoinResults => return Ok(coin_steps::render_results(&params.coin)),
            AlertStep::Watchlist => {
                let watchlists = ctx.services.watchlists.get_watchlists(&ctx.user_id, false).await;
                if watchlists.is_empty() {
                    Screen::new(
                        self.heading("You don't have any watchlists yet."),
                        InlineKeyboardMarkup::new(vec![
                            vec![InlineKeyboardButton::callback("➕ Create Watchlist", "create_watchlist")],
                            go_back_row(),
                        ]),
                    )
                } else {
                    let options: Vec<(String, String)> =
                        watchlists.into_iter().map(|w| (w.name, w.id)).collect();
                    Screen::new(
                        self.heading(&format!(
                            "Selected coin: {}\n\nChoose a watchlist to add the alert to:",
                            params.coin.coin_name()
                        )),
                        picker("select_watchlist", &options),
                    )
                }
            }
            AlertStep::AlertType => {
                let options: Vec<(&str, &str)> = self
                    .alert_types(params)
                    .iter()
                    .map(|t| (t.display_name(), t.as_str()))
                    .collect();
                Screen::new(
                    self.heading("Select the alert type:"),
                    picker("alert_type", &options),
                )
            }
            AlertStep::Condition => {
                let (prefix, kind) = self.condition_source();
                let options = ctx.services.options.get_options(kind).await;
                let options: Vec<(&str, &str)> = options.iter().map(|o| (o.as_str(), o.as_str())).collect();
                Screen::new(self.heading("Select the condition to watch for:"), picker(prefix, &options))
            }
            AlertStep::Indicators => {
                let options = Self::indicator_options(ctx).await;
                let limit = ctx.services.alerts.limits().indicator_limit;
                Screen::new(
                    self.heading(&format!("Select up to {} indicators, then press Next:", limit)),
                    MultiPicker::new(INDICATOR_PREFIX, limit).render(&params.indicators, &options),
                )
            }
            AlertStep::Transitions => {
                let options = Self::transition_options(ctx).await;
                Screen::new(
                    self.heading("Select the transition types, then press Next:"),
                    MultiPicker::new(TRANSITION_PREFIX, options.len()).render(&params.transitions, &options),
                )
            }
            AlertStep::PairTime => Screen::new(
                self.heading(&format!(
                    "Select pairing and timeframe for {}:",
                    params.coin.coin_name()
                )),
                PairTimePicker::new(PAIR_TIME_PREFIX).render(&params.pair_time),
            ),
            AlertStep::Threshold => {
                let (prompt, example) = params
                    .alert_type
                    .map(|t| t.threshold_hint())
                    .unwrap_or(("Enter a threshold value:", "0.2"));
                Screen::new(
                    self.heading(&format!("{}\n\nExample: {}", prompt, example)),
                    InlineKeyboardMarkup::new(vec![go_back_row()]),
                )
            }
            AlertStep::Timeframe => {
                let options: Vec<(&str, &str)> =
                    ALERT_TIMEFRAMES.iter().map(|t| (t.label(), t.as_str())).collect();
                Screen::new(self.heading("Select the timeframe:"), picker("timeframe", &options))
            }
            AlertStep::Pairing => {
                let options: Vec<(&str, &str)> =
                    ALERT_PAIRINGS.iter().map(|p| (p.as_str(), p.as_str())).collect();
                Screen::new(self.heading("Select the pairing:"), picker("pairing", &options))
            }
            AlertStep::Message => Screen::new(
                self.heading("Type a custom message for this alert, or press Skip:"),
                InlineKeyboardMarkup::new(vec![
                    vec![InlineKeyboardButton::callback("Skip", "message_skip")],
                    go_back_row(),
                ]),
            ),
            AlertStep::Confirm => {
                let mut body = self.summary(params).join("\n");
                body.push_str("\n\nAre you sure you want to create this alert?");
                confirmation(self.heading(&body), "✅ Create Alert", self.confirm_data())
            }
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: AlertStep,
        input: Input<'_>,
        params: &mut AlertParams,
        ctx: &StepContext,
    ) -> Result<Outcome<AlertStep>> {
        match step {
            AlertStep::CoinSearch => return coin_steps::handle_search(input, &mut params.coin, ctx).await,
            AlertStep::CoinResults => return coin_steps::handle_results(input, &mut params.coin, ctx).await,
            AlertStep::Threshold => {
                return Ok(match input {
                    Input::Text(text) => match Validator::parse_threshold(text) {
                        Ok(value) => {
                            params.threshold = Some(value);
                            Outcome::next()
                        }
                        Err(e) => Outcome::toast(e.user_message()),
                    },
                    Input::Callback(_) => Outcome::toast("Please type a number."),
                })
            }
            AlertStep::Message => {
                return Ok(match input {
                    Input::Text(text) => match Validator::validate_alert_message(text) {
                        Ok(message) => {
                            params.message = Some(message);
                            Outcome::next()
                        }
                        Err(e) => Outcome::toast(e.user_message()),
                    },
                    Input::Callback("message_skip") => {
                        params.message = None;
                        Outcome::next()
                    }
                    Input::Callback(_) => use_buttons(),
                })
            }
            _ => {}
        }

        let data = match input {
            Input::Callback(data) => data,
            Input::Text(_) => return Ok(use_buttons()),
        };

        let outcome = match step {
            AlertStep::Kind => match data {
                "select_alert_watchlist" => {
                    params.kind = Some(AlertKind::Watchlist);
                    Outcome::next()
                }
                "select_alert_discovery" => {
                    params.kind = Some(AlertKind::Discovery);
                    Outcome::next()
                }
                _ => use_buttons(),
            },
            AlertStep::Watchlist => {
                if data == "create_watchlist" {
                    let watchlist = ctx
                        .services
                        .watchlists
                        .create_watchlist(&ctx.user_id, false, "My Watchlist")
                        .await?;
                    params.watchlist = Some(WatchlistRef { id: watchlist.id, name: watchlist.name });
                    return Ok(Outcome::next().reply(Reply::toast("Watchlist created")));
                }
                let Some(id) = parse_choice("select_watchlist", data) else {
                    return Ok(use_buttons());
                };
                match ctx.services.watchlists.get_watchlist_by_id(id).await {
                    Some(w) if w.telegram_id == ctx.user_id => {
                        params.watchlist = Some(WatchlistRef { id: w.id, name: w.name });
                        Outcome::next()
                    }
                    _ => Outcome::redraw().reply(Reply::notice("Watchlist not found.")),
                }
            }
            AlertStep::AlertType => {
                let chosen = parse_choice("alert_type", data).and_then(|t| t.parse::<AlertType>().ok());
                match chosen {
                    Some(t) if self.alert_types(params).contains(&t) => {
                        params.alert_type = Some(t);
                        Outcome::next()
                    }
                    _ => use_buttons(),
                }
            }
            AlertStep::Condition => {
                let (prefix, kind) = self.condition_source();
                let Some(choice) = parse_choice(prefix, data) else {
                    return Ok(use_buttons());
                };
                let options = ctx.services.options.get_options(kind).await;
                if options.iter().any(|o| o == choice) {
                    params.condition = Some(choice.to_string());
                    Outcome::next()
                } else {
                    use_buttons()
                }
            }
            AlertStep::Indicators => {
                let limit = ctx.services.alerts.limits().indicator_limit;
                match MultiPicker::new(INDICATOR_PREFIX, limit).handle(data, &params.indicators) {
                    Some(outcome) => {
                        let known = Self::indicator_options(ctx).await;
                        if outcome.state.selected.iter().all(|s| known.contains(s)) {
                            Self::apply_multi_pick(outcome, &mut params.indicators)
                        } else {
                            use_buttons()
                        }
                    }
                    None => use_buttons(),
                }
            }
            AlertStep::Transitions => {
                let options = Self::transition_options(ctx).await;
                match MultiPicker::new(TRANSITION_PREFIX, options.len()).handle(data, &params.transitions) {
                    Some(outcome) if outcome.state.selected.iter().all(|s| options.contains(s)) => {
                        Self::apply_multi_pick(outcome, &mut params.transitions)
                    }
                    _ => use_buttons(),
                }
            }
            AlertStep::PairTime => match PairTimePicker::new(PAIR_TIME_PREFIX).handle(data, &params.pair_time) {
                Some(outcome) => {
                    params.pair_time = outcome.state;
                    if outcome.proceed {
                        Outcome::next()
                    } else {
                        Outcome::redraw()
                    }
                }
                None => use_buttons(),
            },
            AlertStep::Timeframe => {
                match parse_choice("timeframe", data).and_then(|t| t.parse::<TimeFrame>().ok()) {
                    Some(timeframe) => {
                        params.timeframe = Some(timeframe);
                        Outcome::next()
                    }
                    None => use_buttons(),
                }
            }
            AlertStep::Pairing => match parse_choice("pairing", data).and_then(|p| p.parse::<Pairing>().ok()) {
                Some(pairing) => {
                    params.pairing = Some(pairing);
                    Outcome::next()
                }
                None => use_buttons(),
            },
            AlertStep::Confirm => {
                if data != self.confirm_data() {
                    return Ok(use_buttons());
                }
                let new_alert = self.new_alert(params, &ctx.user_id)?;
                let alert = ctx.services.alerts.create_alert(new_alert).await?;
                info!("Wizard {} created alert {}", self.name(), alert.id);

                let detail = format!(
                    "🔔 {}\n\n{}",
                    bold(&format!("{} Created", self.title())),
                    escape_markdown(&alert.summary_lines().join("\n"))
                );
                Outcome::leave()
                    .reply(Reply::toast(self.success_message(params)))
                    .reply(Screen::plain(detail).into())
            }
            AlertStep::CoinSearch | AlertStep::CoinResults | AlertStep::Threshold | AlertStep::Message => {
                use_buttons()
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizards::machine::{back_target, first_step, next_step};

    #[test]
    fn test_create_table_skips_coin_steps_for_discovery() {
        let wizard = AlertWizard::new(AlertVariant::Create);
        let mut params = wizard.initial_params();
        params.kind = Some(AlertKind::Discovery);

        assert_eq!(first_step(&wizard, &params), Some(AlertStep::Kind));
        assert_eq!(next_step(&wizard, AlertStep::Kind, &params), Some(AlertStep::AlertType));
        assert_eq!(back_target(&wizard, AlertStep::AlertType, &params), Some(AlertStep::Kind));
    }

    #[test]
    fn test_results_step_only_after_manual_search() {
        let wizard = AlertWizard::new(AlertVariant::Create);
        let mut params = wizard.initial_params();
        params.kind = Some(AlertKind::Watchlist);

        assert_eq!(next_step(&wizard, AlertStep::CoinSearch, &params), Some(AlertStep::Watchlist));
        assert_eq!(back_target(&wizard, AlertStep::Watchlist, &params), Some(AlertStep::CoinSearch));
    }

    #[test]
    fn test_transitions_only_for_market_transition() {
        let wizard = AlertWizard::new(AlertVariant::Discovery);
        let mut params = wizard.initial_params();
        params.alert_type = Some(AlertType::LevelBreak);
        assert_eq!(next_step(&wizard, AlertStep::Indicators, &params), Some(AlertStep::PairTime));

        params.alert_type = Some(AlertType::MarketTransition);
        assert_eq!(next_step(&wizard, AlertStep::Indicators, &params), Some(AlertStep::Transitions));
    }

    #[test]
    fn test_initial_params_per_variant() {
        let params = AlertWizard::new(AlertVariant::LevelBreak).initial_params();
        assert_eq!(params.kind, Some(AlertKind::Discovery));
        assert_eq!(params.alert_type, Some(AlertType::LevelBreak));
        assert_eq!(AlertWizard::new(AlertVariant::Create).initial_params(), AlertParams::default());
    }

    #[test]
    fn test_new_alert_requires_threshold() {
        let wizard = AlertWizard::new(AlertVariant::Create);
        let mut params = wizard.initial_params();
        params.kind = Some(AlertKind::Discovery);
        params.alert_type = Some(AlertType::RsiOverbought);
        params.timeframe = Some(TimeFrame::H4);
        params.pairing = Some(Pairing::Usd);

        assert!(wizard.new_alert(&params, "7").is_err());
        params.threshold = Some(Decimal::from(70));
        let alert = wizard.new_alert(&params, "7").unwrap();
        assert_eq!(alert.kind, AlertKind::Discovery);
        assert!(alert.coin_id.is_none());
    }
}

use async_trait::async_trait;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::handlers::menu::Menu;
use crate::components::{auto_layout, go_back_row, parse_choice, picker, Reply, Screen};
use crate::errors::Result;
use crate::services::types::{
    DiscoveryFeature, DiscoveryPage, DiscoveryQuery, OptionsKind, Pairing, Sentiment, TimeFrame,
};
use crate::utils::{bold, escape_markdown, format_percentage};
use super::machine::{always, Flow, Input, Outcome, StepContext, StepDecl};

pub const SIGNALS_PER_PAGE: usize = 5;
const ALL_INDICATORS: &str = "all";
const SENTIMENTS: [Sentiment; 2] = [Sentiment::BullishToBearish, Sentiment::BearishToBullish];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalsStep {
    Indicator,
    Sentiment,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorChoice {
    All,
    Named(String),
}

impl IndicatorChoice {
    fn label(&self) -> &str {
        match self {
            IndicatorChoice::All => "All Indicators",
            IndicatorChoice::Named(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalsParams {
    pub indicator: Option<IndicatorChoice>,
    pub sentiment: Option<Sentiment>,
    /// One based once results are shown.
    pub page: usize,
}

const STEPS: &[StepDecl<SignalsStep, SignalsParams>] = &[
    StepDecl { step: SignalsStep::Indicator, when: always },
    StepDecl { step: SignalsStep::Sentiment, when: always },
    StepDecl { step: SignalsStep::Results, when: always },
];

/// Coins whose trend recently flipped, filtered by indicator and direction.
pub struct LatestSignalsWizard;

impl LatestSignalsWizard {
    async fn fetch(params: &SignalsParams, ctx: &StepContext) -> Result<DiscoveryPage> {
        let indicator = match &params.indicator {
            Some(IndicatorChoice::Named(name)) => Some(name.clone()),
            _ => None,
        };
        ctx.services
            .discovery
            .discover(&DiscoveryQuery {
                feature: DiscoveryFeature::Signals {
                    indicator,
                    sentiment: params.sentiment.unwrap_or(Sentiment::BearishToBullish),
                },
                pairing: Pairing::Usd,
                timeframe: TimeFrame::D1,
                page: params.page.max(1),
                limit: SIGNALS_PER_PAGE,
            })
            .await
    }

    fn title(params: &SignalsParams) -> String {
        format!(
            "{} • {}",
            params.indicator.as_ref().map_or("All Indicators", |i| i.label()),
            params.sentiment.map_or("", |s| s.label())
        )
    }

    fn results_screen(params: &SignalsParams, page: &DiscoveryPage) -> Screen {
        let heading = format!("🔄 {}", bold(&format!("Latest Signals: {}", Self::title(params))));

        if page.coins.is_empty() {
            return Screen::new(
                format!("{}\n\n{}", heading, escape_markdown("No signals match this selection right now.")),
                InlineKeyboardMarkup::new(vec![
                    vec![InlineKeyboardButton::callback("🔄 New Search", "latest_signals_wizard")],
                    go_back_row(),
                ]),
            );
        }

        let offset = (page.page - 1) * SIGNALS_PER_PAGE;
        let lines: Vec<String> = page
            .coins
            .iter()
            .enumerate()
            .map(|(i, c)| {
                escape_markdown(&format!(
                    "{}. {} ({}) {} | Score {:.1}",
                    offset + i + 1,
                    c.name,
                    c.symbol,
                    format_percentage(c.percent_change_24h),
                    c.trend_score
                ))
            })
            .collect();

        let chart_buttons = page
            .coins
            .iter()
            .map(|c| InlineKeyboardButton::callback(format!("📈 {}", c.symbol), format!("chart_{}", c.id)))
            .collect();
        let mut rows = auto_layout(chart_buttons);

        let mut paging = Vec::new();
        if page.page > 1 {
            paging.push(InlineKeyboardButton::callback("« Previous", format!("signals_page_{}", page.page - 1)));
        }
        if page.has_more {
            paging.push(InlineKeyboardButton::callback("Next »", format!("signals_page_{}", page.page + 1)));
        }
        if !paging.is_empty() {
            rows.push(paging);
        }
        rows.push(vec![
            InlineKeyboardButton::callback("📊 Show Charts", "signals_charts"),
            InlineKeyboardButton::callback("🔄 New Search", "latest_signals_wizard"),
        ]);
        rows.push(go_back_row());

        Screen::new(
            format!("{}\n\n{}", heading, lines.join("\n")),
            InlineKeyboardMarkup::new(rows),
        )
    }
}

#[async_trait]
impl Flow for LatestSignalsWizard {
    type Step = SignalsStep;
    type Params = SignalsParams;

    fn name(&self) -> &'static str {
        "latest_signals"
    }

    fn steps(&self) -> &[StepDecl<SignalsStep, SignalsParams>] {
        STEPS
    }

    fn parent(&self) -> Menu {
        Menu::Discover
    }

    fn clear(&self, step: SignalsStep, params: &mut SignalsParams) {
        match step {
            SignalsStep::Indicator => params.indicator = None,
            SignalsStep::Sentiment => params.sentiment = None,
            SignalsStep::Results => params.page = 0,
        }
    }

    async fn render(&self, step: SignalsStep, params: &mut SignalsParams, ctx: &StepContext) -> Result<Vec<Reply>> {
        let screen = match step {
            SignalsStep::Indicator => {
                let indicators = ctx.services.options.get_options(OptionsKind::Indicators).await;
                let mut options = vec![("All Indicators".to_string(), ALL_INDICATORS.to_string())];
                options.extend(indicators.into_iter().map(|i| (i.clone(), i)));
                Screen::new(
                    format!(
                        "🔄 {}\n\n{}",
                        bold("Latest Signals"),
                        escape_markdown("Which indicator should the signals come from?")
                    ),
                    picker("indicator", &options),
                )
            }
            SignalsStep::Sentiment => {
                let options: Vec<(&str, &str)> = SENTIMENTS.iter().map(|s| (s.label(), s.as_str())).collect();
                Screen::new(
                    format!(
                        "🔄 {}\n\n{}",
                        bold(params.indicator.as_ref().map_or("Latest Signals", |i| i.label())),
                        escape_markdown("Which trend change are you looking for?")
                    ),
                    picker("sentiment", &options),
                )
            }
            SignalsStep::Results => {
                params.page = params.page.max(1);
                let page = Self::fetch(params, ctx).await?;
                Self::results_screen(params, &page)
            }
        };
        Ok(vec![screen.into()])
    }

    async fn handle(
        &self,
        step: SignalsStep,
        input: Input<'_>,
        params: &mut SignalsParams,
        ctx: &StepContext,
    ) -> Result<Outcome<SignalsStep>> {
        let Input::Callback(data) = input else {
            return Ok(Outcome::toast("Please use the buttons above."));
        };

        Ok(match step {
            SignalsStep::Indicator => match parse_choice("indicator", data) {
                Some(ALL_INDICATORS) => {
                    params.indicator = Some(IndicatorChoice::All);
                    Outcome::next()
                }
                Some(name) => {
                    let known = ctx.services.options.get_options(OptionsKind::Indicators).await;
                    if known.iter().any(|k| k == name) {
                        params.indicator = Some(IndicatorChoice::Named(name.to_string()));
                        Outcome::next()
                    } else {
                        Outcome::toast("Please pick an indicator from the list.")
                    }
                }
                None => Outcome::toast("Please pick an indicator from the list."),
            },
            SignalsStep::Sentiment => match parse_choice("sentiment", data).and_then(|s| s.parse::<Sentiment>().ok()) {
                Some(sentiment) => {
                    params.sentiment = Some(sentiment);
                    params.page = 1;
                    Outcome::next()
                }
                None => Outcome::toast("Please choose a direction."),
            },
            SignalsStep::Results => {
                if let Some(page) = parse_choice("signals_page", data).and_then(|p| p.parse::<usize>().ok()) {
                    params.page = page.max(1);
                    Outcome::redraw()
                } else if data == "signals_charts" {
                    let page = Self::fetch(params, ctx).await?;
                    if page.coins.is_empty() {
                        Outcome::toast("No charts to show.")
                    } else {
                        let title = Self::title(params);
                        let charts = ctx
                            .services
                            .charts
                            .discovery_batch(&page.coins, Pairing::Usd, TimeFrame::D1, Some(&title))
                            .await;
                        Outcome::hold().replies(charts)
                    }
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
    use crate::services::types::DiscoveryCoin;

    fn coin(id: &str) -> DiscoveryCoin {
        DiscoveryCoin {
            id: id.into(),
            name: id.into(),
            symbol: id.to_uppercase(),
            price: 1.0,
            percent_change_24h: -3.2,
            volume_24h: 1.0,
            market_cap: 1.0,
            trend_score: 65.0,
            rsi: 50.0,
        }
    }

    #[test]
    fn test_results_paging_buttons() {
        let params = SignalsParams {
            indicator: Some(IndicatorChoice::All),
            sentiment: Some(Sentiment::BullishToBearish),
            page: 2,
        };
        let page = DiscoveryPage {
            coins: vec![coin("aave"), coin("link")],
            total_items: 12,
            page: 2,
            has_more: true,
        };

        let data = LatestSignalsWizard::results_screen(&params, &page).callback_data();
        assert!(data.contains(&"chart_aave".to_string()));
        assert!(data.contains(&"signals_page_1".to_string()));
        assert!(data.contains(&"signals_page_3".to_string()));
        assert_eq!(data.last().map(String::as_str), Some("go_back"));
    }

    #[test]
    fn test_empty_results_offer_new_search() {
        let params = SignalsParams::default();
        let page = DiscoveryPage { coins: Vec::new(), total_items: 0, page: 1, has_more: false };
        let data = LatestSignalsWizard::results_screen(&params, &page).callback_data();
        assert_eq!(data, vec!["latest_signals_wizard", "go_back"]);
    }
}

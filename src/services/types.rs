use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::BotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    PriceUp,
    PriceDown,
    PricePercentageUp,
    PricePercentageDown,
    VolumeUp,
    VolumeDown,
    RsiOverbought,
    RsiOversold,
    MacdCrossover,
    MacdCrossunder,
    MovingAverageCrossover,
    MovingAverageCrossunder,
    MarketTransition,
    LevelBreak,
}

impl AlertType {
    pub const WATCHLIST: [AlertType; 6] = [
        AlertType::PriceUp,
        AlertType::PriceDown,
        AlertType::PricePercentageUp,
        AlertType::PricePercentageDown,
        AlertType::VolumeUp,
        AlertType::VolumeDown,
    ];

    pub const INDICATOR: [AlertType; 6] = [
        AlertType::RsiOverbought,
        AlertType::RsiOversold,
        AlertType::MacdCrossover,
        AlertType::MacdCrossunder,
        AlertType::MovingAverageCrossover,
        AlertType::MovingAverageCrossunder,
    ];

    pub const DISCOVERY: [AlertType; 2] = [AlertType::MarketTransition, AlertType::LevelBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::PriceUp => "PRICE_UP",
            AlertType::PriceDown => "PRICE_DOWN",
            AlertType::PricePercentageUp => "PRICE_PERCENTAGE_UP",
            AlertType::PricePercentageDown => "PRICE_PERCENTAGE_DOWN",
            AlertType::VolumeUp => "VOLUME_UP",
            AlertType::VolumeDown => "VOLUME_DOWN",
            AlertType::RsiOverbought => "RSI_OVERBOUGHT",
            AlertType::RsiOversold => "RSI_OVERSOLD",
            AlertType::MacdCrossover => "MACD_CROSSOVER",
            AlertType::MacdCrossunder => "MACD_CROSSUNDER",
            AlertType::MovingAverageCrossover => "MOVING_AVERAGE_CROSSOVER",
            AlertType::MovingAverageCrossunder => "MOVING_AVERAGE_CROSSUNDER",
            AlertType::MarketTransition => "MARKET_TRANSITION",
            AlertType::LevelBreak => "LEVEL_BREAK",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AlertType::PriceUp => "Price Above",
            AlertType::PriceDown => "Price Below",
            AlertType::PricePercentageUp => "Price Up %",
            AlertType::PricePercentageDown => "Price Down %",
            AlertType::VolumeUp => "Volume Above",
            AlertType::VolumeDown => "Volume Below",
            AlertType::RsiOverbought => "RSI Overbought",
            AlertType::RsiOversold => "RSI Oversold",
            AlertType::MacdCrossover => "MACD Crossover",
            AlertType::MacdCrossunder => "MACD Crossunder",
            AlertType::MovingAverageCrossover => "MA Crossover",
            AlertType::MovingAverageCrossunder => "MA Crossunder",
            AlertType::MarketTransition => "Market Transition",
            AlertType::LevelBreak => "Level Break",
        }
    }

    /// Prompt title and example value for the threshold step.
    pub fn threshold_hint(&self) -> (&'static str, &'static str) {
        match self {
            AlertType::PriceUp | AlertType::PriceDown => ("Enter the price value:", "1000"),
            AlertType::PricePercentageUp | AlertType::PricePercentageDown => {
                ("Enter the percentage change:", "5")
            }
            AlertType::VolumeUp | AlertType::VolumeDown => ("Enter the volume value:", "1000000"),
            AlertType::RsiOverbought => ("Enter a value between 0-100 (typically 70-80):", "70"),
            AlertType::RsiOversold => ("Enter a value between 0-100 (typically 20-30):", "30"),
            AlertType::MacdCrossover | AlertType::MacdCrossunder => {
                ("Enter a sensitivity value (typically between 0.1-2):", "0.5")
            }
            _ => ("Enter a threshold value:", "0.2"),
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AlertType {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::WATCHLIST
            .iter()
            .chain(Self::INDICATOR.iter())
            .chain(Self::DISCOVERY.iter())
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BotError::validation(format!("Unknown alert type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    H1,
    H4,
    H6,
    H12,
    D1,
    W1,
    M1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 7] = [
        TimeFrame::H1,
        TimeFrame::H4,
        TimeFrame::H6,
        TimeFrame::H12,
        TimeFrame::D1,
        TimeFrame::W1,
        TimeFrame::M1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::H1 => "H1",
            TimeFrame::H4 => "H4",
            TimeFrame::H6 => "H6",
            TimeFrame::H12 => "H12",
            TimeFrame::D1 => "D1",
            TimeFrame::W1 => "W1",
            TimeFrame::M1 => "M1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::H1 => "1h",
            TimeFrame::H4 => "4h",
            TimeFrame::H6 => "6h",
            TimeFrame::H12 => "12h",
            TimeFrame::D1 => "1D",
            TimeFrame::W1 => "1W",
            TimeFrame::M1 => "1M",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimeFrame::H1 => "1 Hour",
            TimeFrame::H4 => "4 Hours",
            TimeFrame::H6 => "6 Hours",
            TimeFrame::H12 => "12 Hours",
            TimeFrame::D1 => "1 Day",
            TimeFrame::W1 => "1 Week",
            TimeFrame::M1 => "1 Month",
        }
    }
}

impl FromStr for TimeFrame {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BotError::validation(format!("Unknown timeframe: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pairing {
    Usd,
    Btc,
    Eth,
    All,
}

impl Pairing {
    pub const ALL: [Pairing; 4] = [Pairing::Usd, Pairing::Btc, Pairing::Eth, Pairing::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pairing::Usd => "USD",
            Pairing::Btc => "BTC",
            Pairing::Eth => "ETH",
            Pairing::All => "ALL",
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pairing {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| BotError::validation(format!("Unknown pairing: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Watchlist,
    Discovery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Watchlist => "watchlist",
            AlertKind::Discovery => "discovery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Active,
    Inactive,
}

/// A stored alert definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub kind: AlertKind,
    pub alert_type: AlertType,
    pub coin_id: Option<String>,
    pub coin_name: Option<String>,
    pub watchlist_id: Option<String>,
    pub watchlist_name: Option<String>,
    pub threshold: Option<Decimal>,
    pub timeframe: TimeFrame,
    pub pairing: Pairing,
    pub message: Option<String>,
    pub indicators: Vec<String>,
    pub conditions: Vec<String>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// What the alert watches, for list labels.
    pub fn subject(&self) -> String {
        match (&self.coin_name, &self.watchlist_name) {
            (Some(coin), Some(watchlist)) => format!("{} • {}", coin, watchlist),
            (Some(coin), None) => coin.clone(),
            (None, Some(watchlist)) => watchlist.clone(),
            (None, None) => "All coins".to_string(),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Type: {}", self.alert_type.display_name()),
            format!("Target: {}", self.subject()),
        ];
        if let Some(threshold) = self.threshold {
            lines.push(format!("Threshold: {}", threshold));
        }
        if !self.indicators.is_empty() {
            lines.push(format!("Indicators: {}", self.indicators.join(", ")));
        }
        if !self.conditions.is_empty() {
            lines.push(format!("Conditions: {}", self.conditions.join(", ")));
        }
        lines.push(format!("Timeframe: {}", self.timeframe.display_name()));
        lines.push(format!("Pairing: {}", self.pairing));
        if let Some(message) = &self.message {
            lines.push(format!("Message: \"{}\"", message));
        }
        lines.push(format!(
            "Status: {}",
            if self.is_active() { "Active" } else { "Paused" }
        ));
        lines
    }
}

/// Everything needed to create an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub user_id: String,
    pub kind: AlertKind,
    pub alert_type: AlertType,
    pub coin_id: Option<String>,
    pub coin_name: Option<String>,
    pub watchlist_id: Option<String>,
    pub watchlist_name: Option<String>,
    pub threshold: Option<Decimal>,
    pub timeframe: TimeFrame,
    pub pairing: Pairing,
    pub message: Option<String>,
    pub indicators: Vec<String>,
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertLimits {
    pub watchlist_limit: usize,
    pub discovery_limit: usize,
    pub indicator_limit: usize,
    pub price_level_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingAlerts {
    pub watchlist: usize,
    pub discovery: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertsSummary {
    pub total_alerts: usize,
    pub active_alerts: usize,
    pub watchlist_alerts: usize,
    pub discovery_alerts: usize,
    pub remaining: RemainingAlerts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: u32,
}

impl Coin {
    pub fn label(&self) -> String {
        format!("#{} {} ({})", self.market_cap_rank, self.name, self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub coin: Coin,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    pub telegram_id: String,
    pub is_group: bool,
    pub coins: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthType {
    Strongest,
    Weakest,
}

impl StrengthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthType::Strongest => "strongest",
            StrengthType::Weakest => "weakest",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StrengthType::Strongest => "Strongest Performers",
            StrengthType::Weakest => "Weakest Performers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    BullishToBearish,
    BearishToBullish,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::BullishToBearish => "bullish_to_bearish",
            Sentiment::BearishToBullish => "bearish_to_bullish",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::BullishToBearish => "Bullish → Bearish",
            Sentiment::BearishToBullish => "Bearish → Bullish",
        }
    }
}

impl FromStr for Sentiment {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bullish_to_bearish" => Ok(Sentiment::BullishToBearish),
            "bearish_to_bullish" => Ok(Sentiment::BearishToBullish),
            other => Err(BotError::validation(format!("Unknown sentiment: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub percent_change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub trend_score: f64,
    pub rsi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryFeature {
    Strength(StrengthType),
    Signals {
        indicator: Option<String>,
        sentiment: Sentiment,
    },
    MarketCap,
    Volume,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub feature: DiscoveryFeature,
    pub pairing: Pairing,
    pub timeframe: TimeFrame,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryPage {
    pub coins: Vec<DiscoveryCoin>,
    pub total_items: usize,
    pub page: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsKind {
    Indicators,
    Alerts,
    Exchanges,
    Strategies,
    MarketTransitions,
    LevelBreaks,
    Other,
}

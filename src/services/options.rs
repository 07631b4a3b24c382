use std::time::Duration;
use tracing::debug;

use super::simulate_latency;
use super::types::OptionsKind;

/// Static option lists for pickers.
pub struct OptionsService {
    latency: Duration,
}

impl OptionsService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub async fn get_options(&self, kind: OptionsKind) -> Vec<String> {
        debug!("Fetching options for {:?}", kind);
        simulate_latency(self.latency).await;

        let options: &[&str] = match kind {
            OptionsKind::Indicators => &[
                "RSI",
                "MACD",
                "Bollinger Bands",
                "Moving Average",
                "Stochastic",
                "Ichimoku Cloud",
            ],
            OptionsKind::Alerts => &[
                "Price Alert",
                "Volume Alert",
                "Pattern Alert",
                "Indicator Alert",
                "News Alert",
            ],
            OptionsKind::Exchanges => &[
                "Binance", "Coinbase", "Kraken", "Kucoin", "Bitfinex", "FTX", "Huobi",
            ],
            OptionsKind::Strategies => &[
                "Trend Following",
                "Mean Reversion",
                "Breakout",
                "Range Trading",
                "Arbitrage",
                "Grid Trading",
            ],
            OptionsKind::MarketTransitions => &["Bullish to Bearish", "Bearish to Bullish"],
            OptionsKind::LevelBreaks => &["Support Break", "Resistance Break"],
            OptionsKind::Other => &["Option 1", "Option 2", "Option 3", "Option 4", "Option 5"],
        };

        options.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_option_lists() {
        let service = OptionsService::new(Duration::ZERO);
        assert_eq!(service.get_options(OptionsKind::Indicators).await.len(), 6);
        assert_eq!(
            service.get_options(OptionsKind::MarketTransitions).await,
            vec!["Bullish to Bearish", "Bearish to Bullish"]
        );
        assert_eq!(service.get_options(OptionsKind::Other).await[4], "Option 5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency() {
        let service = OptionsService::new(Duration::from_millis(300));
        let started = tokio::time::Instant::now();
        service.get_options(OptionsKind::Exchanges).await;
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}

use std::time::Duration;

// Shared callback tokens
pub const GO_BACK: &str = "go_back";
pub const GO_BACK_LABEL: &str = "← Go Back";
pub const MAIN_MENU: &str = "main_menu";

// Coin search
pub const COIN_SEARCH_PREFIX: &str = "coinsearch";
pub const RESULTS_PER_PAGE: usize = 5;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const WIZARD_CONFIDENCE_THRESHOLD: f64 = 2.5;
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SEARCH_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_SEARCH_COOLDOWN_SECS: u64 = 30;

// Wizard execution
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 20;
pub const ALERT_LABEL_MAX_LEN: usize = 40;
pub const MAX_ALERT_MESSAGE_LEN: usize = 200;
pub const MAX_SEARCH_QUERY_LEN: usize = 50;

// Alert limits
pub const WATCHLIST_ALERT_LIMIT: usize = 10;
pub const DISCOVERY_ALERT_LIMIT: usize = 5;
pub const INDICATOR_LIMIT: usize = 3;
pub const PRICE_LEVEL_LIMIT: usize = 15;

// Simulated backend latency
pub const ALERT_SERVICE_DELAY: Duration = Duration::from_millis(500);
pub const WATCHLIST_SERVICE_DELAY: Duration = Duration::from_millis(300);
pub const OPTIONS_SERVICE_DELAY: Duration = Duration::from_millis(300);
pub const DISCOVERY_SERVICE_DELAY: Duration = Duration::from_millis(800);
pub const COIN_SEARCH_DELAY: Duration = Duration::from_millis(200);
pub const CHART_PACING: Duration = Duration::from_millis(500);

// Discovery charts
pub const MAX_CHARTS_PER_BATCH: usize = 5;
pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 360;

/// Telegram id that owns the seeded demo data.
pub const DEMO_USER_ID: &str = "12345";

pub mod add_coin;
pub mod alert;
pub mod alert_browser;
pub mod charting;
pub mod coin_steps;
pub mod delete_alert;
pub mod delete_watchlist;
pub mod discovery_alerts;
pub mod latest_signals;
pub mod machine;
pub mod scene;
pub mod strength;
pub mod watchlist_alerts;

pub use alert::{AlertVariant, AlertWizard};
pub use machine::{Flow, Input, Progress, StepContext};
pub use scene::{Entry, Scene, SceneKind};

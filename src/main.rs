use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use trendsniper_bot::bot::TelegramBot;
use trendsniper_bot::observability::TracingSetup;
use trendsniper_bot::services::Services;
use trendsniper_bot::utils::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    TracingSetup::init(config.log_format)?;
    config.validate()?;

    info!("🚀 Starting TrendSniper bot");
    if config.allowed_users.is_empty() {
        info!("No ALLOWED_USERS set, the bot answers everyone");
    }

    let config = Arc::new(config);
    let services = Arc::new(Services::from_config(&config));

    let bot = TelegramBot::new(config, services);
    if let Err(e) = bot.run().await {
        error!("Bot stopped with an error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

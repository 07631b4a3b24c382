use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{error, info};

use crate::{errors::Result, services::Services, utils::Config};

use super::{
    commands::Command,
    context::BotContext,
    handlers::{CallbackHandler, CommandHandler, TextMessageHandler},
};

/// Main Telegram bot struct
pub struct TelegramBot {
    config: Arc<Config>,
    services: Arc<Services>,
}

impl TelegramBot {
    pub fn new(config: Arc<Config>, services: Arc<Services>) -> Self {
        Self { config, services }
    }

    /// Run the bot dispatcher until Ctrl-C or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        let bot = Bot::new(&self.config.telegram_bot_token);

        info!("🤖 Starting Telegram bot...");

        if self.config.drop_pending_updates {
            bot.delete_webhook().drop_pending_updates(true).await?;
            info!("Dropped pending updates");
        }
        bot.set_my_commands(Command::bot_commands()).await?;

        let context = Arc::new(BotContext::new(self.config.clone(), self.services.clone()));

        let handler = dptree::entry()
            .branch(Update::filter_message()
                .filter_command::<Command>()
                .endpoint(CommandHandler::handle))
            .branch(Update::filter_message()
                .endpoint(TextMessageHandler::handle))
            .branch(Update::filter_callback_query()
                .endpoint(CallbackHandler::handle));

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![context])
            .enable_ctrlc_handler()
            .build();

        Self::stop_on_sigterm(dispatcher.shutdown_token());
        dispatcher.dispatch().await;

        info!("Telegram bot stopped");
        Ok(())
    }

    #[cfg(unix)]
    fn stop_on_sigterm(token: teloxide::dispatching::ShutdownToken) {
        use tokio::signal::unix::{signal, SignalKind};

        tokio::spawn(async move {
            let mut terminate = match signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Cannot listen for SIGTERM: {}", e);
                    return;
                }
            };
            terminate.recv().await;
            info!("SIGTERM received, shutting down");
            match token.shutdown() {
                Ok(done) => done.await,
                Err(e) => error!("Dispatcher shutdown failed: {}", e),
            }
        });
    }

    #[cfg(not(unix))]
    fn stop_on_sigterm(_token: teloxide::dispatching::ShutdownToken) {}
}

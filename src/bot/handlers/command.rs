use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

use crate::bot::commands::Command;
use crate::bot::context::BotContext;
use crate::components::Reply;
use crate::wizards::{AlertVariant, Entry, SceneKind};
use super::delivery::deliver;
use super::menu::Menu;

/// Handler for slash commands
pub struct CommandHandler;

impl CommandHandler {
    pub async fn handle(bot: Bot, msg: Message, cmd: Command, ctx: Arc<BotContext>) -> ResponseResult<()> {
        let user_id = msg
            .from
            .as_ref()
            .map(|u| u.id.0.to_string())
            .unwrap_or_default();

        if !ctx.config.is_user_allowed(&user_id) {
            bot.send_message(msg.chat.id, "⛔ Unauthorized access").await?;
            return Ok(());
        }

        info!("Processing command {:?} from user {}", cmd, user_id);
        let replies = Self::route(&ctx, msg.chat.id, &user_id, cmd).await;
        deliver(&bot, msg.chat.id, replies).await
    }

    /// A command always abandons the active wizard first.
    pub async fn route(ctx: &BotContext, chat: ChatId, user_id: &str, cmd: Command) -> Vec<Reply> {
        let abandoned = ctx.sessions.clear(chat).await;
        if let Some(scene) = &abandoned {
            info!("Command {:?} abandoned wizard {} in chat {}", cmd, scene.name(), chat);
        }

        match cmd {
            Command::Start => ctx.menu(Menu::Main, user_id).await,
            Command::Watchlist => ctx.menu(Menu::Watchlists, user_id).await,
            Command::Alerts => ctx.menu(Menu::Alerts, user_id).await,
            Command::Discover => ctx.menu(Menu::Discover, user_id).await,
            Command::Analysis => ctx.start_scene(chat, user_id, Entry::new(SceneKind::Charting)).await,
            Command::AddCoin => ctx.start_scene(chat, user_id, Entry::new(SceneKind::AddCoin)).await,
            Command::AddAlert => {
                ctx.start_scene(chat, user_id, Entry::new(SceneKind::Alert(AlertVariant::Create)))
                    .await
            }
            Command::Help => vec![Reply::notice(Command::descriptions().to_string())],
            Command::Cancel => {
                let notice = if abandoned.is_some() {
                    "Operation cancelled."
                } else {
                    "Nothing to cancel."
                };
                let mut replies = vec![Reply::notice(notice)];
                replies.extend(ctx.menu(Menu::Main, user_id).await);
                replies
            }
        }
    }
}

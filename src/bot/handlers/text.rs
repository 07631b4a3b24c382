use std::sync::Arc;
use teloxide::{prelude::*, types::Message};
use tracing::debug;

use crate::bot::context::BotContext;
use crate::components::Reply;
use crate::wizards::scene;
use crate::wizards::Input;
use super::delivery::deliver;
use super::menu::Menu;

/// Handler for free text, which only means something inside a wizard
pub struct TextMessageHandler;

impl TextMessageHandler {
    pub async fn handle(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
        let user_id = msg
            .from
            .as_ref()
            .map(|u| u.id.0.to_string())
            .unwrap_or_default();

        if !ctx.config.is_user_allowed(&user_id) {
            return Ok(());
        }

        let Some(text) = msg.text() else {
            return Ok(());
        };

        let replies = Self::route(&ctx, msg.chat.id, &user_id, text).await;
        deliver(&bot, msg.chat.id, replies).await
    }

    pub async fn route(ctx: &BotContext, chat: ChatId, user_id: &str, text: &str) -> Vec<Reply> {
        match ctx.sessions.take(chat).await {
            Some(current) => {
                debug!("Text input for {} in chat {}", current.name(), chat);
                let progress = scene::feed(current, Input::Text(text), &ctx.step_context(user_id)).await;
                ctx.settle(chat, user_id, progress).await
            }
            None => {
                let mut replies = vec![Reply::notice("Please use the menu below or /help.")];
                replies.extend(ctx.menu(Menu::Main, user_id).await);
                replies
            }
        }
    }
}

use std::sync::Arc;
use teloxide::{prelude::*, types::CallbackQuery};
use tracing::{info, warn};

use crate::bot::context::BotContext;
use crate::components::Reply;
use crate::constants::GO_BACK;
use crate::wizards::scene::{self, Entry};
use crate::wizards::Input;
use super::delivery::{deliver, take_toast};
use super::menu::Menu;

/// Handler for callback queries from inline keyboards
pub struct CallbackHandler;

impl CallbackHandler {
    pub async fn handle(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
        let user_id = q.from.id.0.to_string();

        if !ctx.config.is_user_allowed(&user_id) {
            bot.answer_callback_query(q.id.clone())
                .text("⛔ Unauthorized access")
                .await?;
            return Ok(());
        }

        let (Some(chat_id), Some(data)) = (q.message.as_ref().map(|m| m.chat().id), q.data.as_deref()) else {
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(());
        };

        info!("Callback {} from user {}", data, user_id);
        let mut replies = Self::route(&ctx, chat_id, &user_id, data).await;

        let mut answer = bot.answer_callback_query(q.id.clone());
        if let Some(text) = take_toast(&mut replies) {
            answer = answer.text(text);
        }
        answer.await?;

        deliver(&bot, chat_id, replies).await
    }

    /// Menus and wizard entries always win over the active wizard.
    pub async fn route(ctx: &BotContext, chat: ChatId, user_id: &str, data: &str) -> Vec<Reply> {
        if let Some(menu) = Menu::from_callback(data) {
            ctx.sessions.clear(chat).await;
            return ctx.menu(menu, user_id).await;
        }

        if let Some(entry) = Entry::from_callback(data) {
            if let Some(previous) = ctx.sessions.clear(chat).await {
                info!("Chat {} left {} for {:?}", chat, previous.name(), entry.kind);
            }
            return ctx.start_scene(chat, user_id, entry).await;
        }

        if let Some(current) = ctx.sessions.take(chat).await {
            let progress = scene::feed(current, Input::Callback(data), &ctx.step_context(user_id)).await;
            return ctx.settle(chat, user_id, progress).await;
        }

        if data == GO_BACK {
            return ctx.menu(Menu::Main, user_id).await;
        }

        warn!("Stale callback {} in chat {}", data, chat);
        let mut replies = vec![Reply::toast("This button is no longer active.")];
        replies.extend(ctx.menu(Menu::Main, user_id).await);
        replies
    }
}

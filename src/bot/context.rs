use std::sync::Arc;
use teloxide::types::ChatId;
use tracing::error;

use crate::components::Reply;
use crate::services::Services;
use crate::utils::Config;
use crate::wizards::scene::{self, Entry};
use crate::wizards::{Progress, Scene, StepContext};
use super::handlers::menu::{Menu, MenuCreator};
use super::session::SessionStore;

/// Everything the update handlers share.
pub struct BotContext {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
    pub sessions: SessionStore,
}

impl BotContext {
    pub fn new(config: Arc<Config>, services: Arc<Services>) -> Self {
        Self {
            config,
            services,
            sessions: SessionStore::new(),
        }
    }

    pub fn step_context(&self, user_id: &str) -> StepContext {
        StepContext::new(self.services.clone(), user_id, self.config.step_timeout())
    }

    pub async fn menu(&self, menu: Menu, user_id: &str) -> Vec<Reply> {
        match MenuCreator::render(menu, &self.services, user_id).await {
            Ok(screen) => vec![screen.into()],
            Err(e) => {
                error!("Failed to render {:?} menu: {}", menu, e);
                vec![Reply::notice(e.user_message())]
            }
        }
    }

    pub async fn start_scene(&self, chat: ChatId, user_id: &str, entry: Entry) -> Vec<Reply> {
        let progress = scene::start(entry, &self.step_context(user_id)).await;
        self.settle(chat, user_id, progress).await
    }

    /// Store a still running scene, or render the menu a finished one exits to.
    pub async fn settle(&self, chat: ChatId, user_id: &str, progress: Progress<Scene>) -> Vec<Reply> {
        let mut replies = progress.replies;
        match progress.state {
            Some(scene) => self.sessions.put(chat, scene).await,
            None => {
                if let Some(menu) = progress.exit_to {
                    replies.extend(self.menu(menu, user_id).await);
                }
            }
        }
        replies
    }
}

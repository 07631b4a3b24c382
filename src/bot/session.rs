use std::collections::HashMap;
use teloxide::types::ChatId;
use tokio::sync::RwLock;
use tracing::debug;

use crate::wizards::Scene;

/// Active wizard per chat.
#[derive(Default)]
pub struct SessionStore {
    scenes: RwLock<HashMap<ChatId, Scene>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the chat's scene for the duration of an update.
    pub async fn take(&self, chat: ChatId) -> Option<Scene> {
        self.scenes.write().await.remove(&chat)
    }

    pub async fn put(&self, chat: ChatId, scene: Scene) {
        debug!("Chat {} is now in wizard {}", chat, scene.name());
        self.scenes.write().await.insert(chat, scene);
    }

    /// Abandon whatever wizard the chat was in.
    pub async fn clear(&self, chat: ChatId) -> Option<Scene> {
        self.take(chat).await
    }

    pub async fn active(&self, chat: ChatId) -> Option<&'static str> {
        self.scenes.read().await.get(&chat).map(Scene::name)
    }

    pub async fn len(&self) -> usize {
        self.scenes.read().await.len()
    }
}

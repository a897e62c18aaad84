use std::fmt::Display;

use log::*;
use telegram_tools::ChatApi;
use tokio::sync::RwLock;

/// The chat that receives notifications. Empty until channel discovery has found one.
#[derive(Debug, Default)]
pub struct ChatTarget(RwLock<Option<i64>>);

impl ChatTarget {
    pub fn new(chat_id: Option<i64>) -> Self {
        Self(RwLock::new(chat_id))
    }

    pub async fn get(&self) -> Option<i64> {
        *self.0.read().await
    }

    pub async fn set(&self, chat_id: i64) {
        *self.0.write().await = Some(chat_id);
    }
}

/// Sends text to the current chat target. Delivery is best effort: failures are logged, never retried and never
/// reported to the caller.
pub struct Notifier<C> {
    api: C,
    target: ChatTarget,
}

impl<C: ChatApi> Notifier<C> {
    pub fn new(api: C, target: ChatTarget) -> Self {
        Self { api, target }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    /// Returns true if the message was delivered.
    pub async fn say<S: Display>(&self, message: S) -> bool {
        let Some(chat_id) = self.target.get().await else {
            warn!(
                "📣️ No chat to notify yet. Send /here in the chat that should receive notifications. Dropping: \
                 {message}"
            );
            return false;
        };
        match self.api.send_message(chat_id, &message.to_string()).await {
            Ok(_) => {
                trace!("📣️ Notification sent to {chat_id}");
                true
            },
            Err(e) => {
                error!("📣️ Could not send notification to {chat_id}. {e}");
                false
            },
        }
    }
}

//! # Channel discovery
//!
//! Works out which chat should receive notifications. This happens in two phases:
//!
//! 1. Before the HTTP server starts: the bot token is verified, and a configured channel (`TELECHAN`) is resolved to
//!    a chat id. Failures here are fatal.
//! 2. In the background, once the server is running: if no chat is known yet, long-poll the bot's updates until
//!    someone sends `/here` in a chat. That message is deleted and its chat becomes the target. A greeting is then
//!    sent to the target either way.

use std::time::Duration;

use log::*;
use telegram_tools::{ChatApi, ChatRef, User};
use thiserror::Error;

use crate::notifier::Notifier;

/// The command a member sends in the chat that should receive notifications.
pub const ARRIVAL_COMMAND: &str = "/here";
/// Server-side timeout for each `getUpdates` long poll, in seconds.
pub const UPDATE_TIMEOUT_SECS: u64 = 60;
/// Pause before polling again after a failed `getUpdates` call.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("The Telegram bot token is missing or invalid. {0}")]
    InvalidBotToken(String),
    #[error("Could not resolve the configured channel {channel}. {reason}")]
    ChannelResolution { channel: String, reason: String },
    #[error("No /here message arrived within {0} seconds")]
    Timeout(u64),
}

/// Checks that the bot token is accepted by the Bot API and returns the bot's account.
pub async fn verify_bot<C: ChatApi>(api: &C) -> Result<User, DiscoveryError> {
    let me = api.get_me().await.map_err(|e| DiscoveryError::InvalidBotToken(e.to_string()))?;
    info!("🔭️ Authorized on account {}", me.username.as_deref().unwrap_or(me.first_name.as_str()));
    Ok(me)
}

/// Turns the configured channel, if any, into a chat id. Numeric values are used as they are; anything else is
/// looked up as a public channel or group name.
pub async fn resolve_configured_channel<C: ChatApi>(
    api: &C,
    channel: Option<&str>,
) -> Result<Option<i64>, DiscoveryError> {
    let Some(channel) = channel else {
        return Ok(None);
    };
    match ChatRef::parse(channel) {
        ChatRef::Id(id) => {
            debug!("🔭️ Using configured chat id {id}");
            Ok(Some(id))
        },
        chat @ ChatRef::Username(_) => {
            debug!("🔭️ Looking up channel {chat}");
            let found = api.get_chat(&chat).await.map_err(|e| DiscoveryError::ChannelResolution {
                channel: channel.to_string(),
                reason: e.to_string(),
            })?;
            info!("🔭️ Channel {chat} has chat id {}", found.id);
            Ok(Some(found.id))
        },
    }
}

/// Long-polls for updates until an arrival command shows up, deletes that message, and returns its chat id.
/// `bot_username` is this bot's name: `/here@<name>` is accepted for it and ignored for any other bot.
///
/// This never gives up on its own. Wrap it in a timeout to bound it.
pub async fn wait_for_arrival<C: ChatApi>(api: &C, bot_username: Option<&str>) -> i64 {
    let mut offset = 0;
    info!("🔭️ Waiting for a {ARRIVAL_COMMAND} message");
    loop {
        let updates = match api.get_updates(offset, UPDATE_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("🔭️ Failed to get updates, retrying in {} seconds. {e}", POLL_RETRY_DELAY.as_secs());
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            },
        };
        if updates.is_empty() {
            tokio::task::yield_now().await;
            continue;
        }
        for update in updates {
            offset = offset.max(update.update_id + 1);
            trace!("🔭️ Update {}: {:?}", update.update_id, update.any_message().and_then(|m| m.text.as_deref()));
            let Some(message) = update.any_message() else {
                continue;
            };
            if message.is_command(ARRIVAL_COMMAND, bot_username) {
                let chat_id = message.chat.id;
                if let Err(e) = api.delete_message(chat_id, message.message_id).await {
                    warn!("🔭️ Could not delete the {ARRIVAL_COMMAND} message in {chat_id}. {e}");
                }
                info!("🔭️ {ARRIVAL_COMMAND} received. Notifications will go to chat {chat_id}");
                return chat_id;
            }
        }
    }
}

/// Runs the background phase of discovery: find a chat if none is known yet, then greet it.
pub async fn complete_discovery<C: ChatApi>(
    notifier: &Notifier<C>,
    bot_username: Option<&str>,
    timeout: Option<Duration>,
) -> Result<i64, DiscoveryError> {
    let chat_id = match notifier.target().get().await {
        Some(id) => id,
        None => {
            let id = match timeout {
                Some(t) => tokio::time::timeout(t, wait_for_arrival(notifier.api(), bot_username))
                    .await
                    .map_err(|_| DiscoveryError::Timeout(t.as_secs()))?,
                None => wait_for_arrival(notifier.api(), bot_username).await,
            };
            notifier.target().set(id).await;
            id
        },
    };
    notifier.say(format!("Hi guys: {chat_id}")).await;
    Ok(chat_id)
}

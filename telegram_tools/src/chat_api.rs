use crate::{
    types::{Chat, ChatRef, Message, Update, User},
    TelegramApiError,
};

/// The handful of Bot API operations the relay needs. [`crate::TelegramApi`] is the real implementation; anything
/// else implementing this trait (e.g. a mock) can stand in for it.
#[allow(async_fn_in_trait)]
pub trait ChatApi {
    /// Returns the bot's own account. A cheap way to check that the token is valid.
    async fn get_me(&self) -> Result<User, TelegramApiError>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramApiError>;

    async fn get_chat(&self, chat: &ChatRef) -> Result<Chat, TelegramApiError>;

    /// Long-polls for updates with an id of at least `offset`. The call returns as soon as there are updates, or
    /// after `timeout` seconds with an empty list.
    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, TelegramApiError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, TelegramApiError>;
}

use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::{
    types::{ApiResponse, Chat, ChatRef, Message, Update, User},
    ChatApi,
    TelegramApiError,
    TelegramConfig,
};

/// Extra time allowed on top of a long poll's server-side timeout before the HTTP request itself gives up.
const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TelegramApi {
    config: TelegramConfig,
    client: Arc<Client>,
}

impl TelegramApi {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramApiError> {
        if config.token.reveal().trim().is_empty() {
            return Err(TelegramApiError::Initialization("The bot token is empty".to_string()));
        }
        let client = Client::builder().build().map_err(|e| TelegramApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Calls a Bot API method and unwraps the response envelope.
    pub async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramApiError> {
        // The token is part of the URL. Keep it out of logs and errors.
        trace!("📣️ Calling Bot API method {method}");
        let mut req = self.client.post(self.url(method)).json(body);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }
        let response = req.send().await.map_err(|e| TelegramApiError::ResponseError(e.without_url().to_string()))?;
        let status = response.status();
        let data = response.bytes().await.map_err(|e| TelegramApiError::ResponseError(e.without_url().to_string()))?;
        let envelope = serde_json::from_slice::<ApiResponse<T>>(&data).map_err(|e| {
            debug!("📣️ Bot API method {method} returned {status} with an unreadable body");
            TelegramApiError::JsonError(e.to_string())
        })?;
        envelope.into_result()
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.base_url, self.config.token.reveal())
    }
}

impl ChatApi for TelegramApi {
    async fn get_me(&self) -> Result<User, TelegramApiError> {
        self.call::<User, _>("getMe", &json!({}), None).await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramApiError> {
        self.call::<Message, _>("sendMessage", &json!({ "chat_id": chat_id, "text": text }), None).await
    }

    async fn get_chat(&self, chat: &ChatRef) -> Result<Chat, TelegramApiError> {
        self.call::<Chat, _>("getChat", &json!({ "chat_id": chat }), None).await
    }

    async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, TelegramApiError> {
        let body = json!({ "offset": offset, "timeout": timeout, "allowed_updates": ["message", "channel_post"] });
        let limit = Duration::from_secs(timeout) + LONG_POLL_MARGIN;
        self.call::<Vec<Update>, _>("getUpdates", &body, Some(limit)).await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, TelegramApiError> {
        self.call::<bool, _>("deleteMessage", &json!({ "chat_id": chat_id, "message_id": message_id }), None).await
    }
}

#[cfg(test)]
mod test {
    use relay_common::Secret;

    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let err = TelegramApi::new(TelegramConfig::new(Secret::new("  ".to_string()))).err();
        assert!(matches!(err, Some(TelegramApiError::Initialization(_))));
    }

    #[test]
    fn method_urls() {
        let config = TelegramConfig::new(Secret::new("123:abc".to_string())).with_base_url("http://localhost:8081/");
        let api = TelegramApi::new(config).unwrap();
        assert_eq!(api.url("getMe"), "http://localhost:8081/bot123:abc/getMe");
    }
}

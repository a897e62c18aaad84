use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::TelegramApiError;

/// Every Bot API response is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, TelegramApiError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(TelegramApiError::JsonError("Response was ok, but contained no result".to_string())),
            (false, _) => Err(TelegramApiError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self.description.unwrap_or_else(|| "No description given".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub chat_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// True if the message is the bot command `command`. A command addressed to a bot (`/here@my_bot`) only counts
    /// when it names `bot_username`, so commands meant for other bots in the same group are ignored.
    pub fn is_command(&self, command: &str, bot_username: Option<&str>) -> bool {
        let Some(word) = self.text.as_deref().and_then(|t| t.split_whitespace().next()) else {
            return false;
        };
        match word.split_once('@') {
            None => word == command,
            Some((cmd, addressee)) => {
                cmd == command &&
                    bot_username.is_some_and(|me| me.trim_start_matches('@').eq_ignore_ascii_case(addressee))
            },
        }
    }
}

/// An incoming update. Group messages arrive as `message`, posts in channels as `channel_post`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub channel_post: Option<Message>,
}

impl Update {
    pub fn any_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

/// How a chat is named in configuration: either its numeric id, or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRef {
    Id(i64),
    Username(String),
}

impl ChatRef {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) if s.starts_with('@') => Self::Username(s.to_string()),
            Err(_) => Self::Username(format!("@{s}")),
        }
    }
}

impl Display for ChatRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => write!(f, "{name}"),
        }
    }
}

impl Serialize for ChatRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => serializer.serialize_i64(*id),
            Self::Username(name) => serializer.serialize_str(name),
        }
    }
}

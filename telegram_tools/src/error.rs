use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TelegramApiError {
    #[error("Could not initialize bot client: {0}")]
    Initialization(String),
    #[error("Could not reach the Bot API: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Bot API error {code}. {description}")]
    Api { code: i64, description: String },
}

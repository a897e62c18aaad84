mod api;
mod chat_api;
mod config;
mod error;

pub mod types;

pub use api::TelegramApi;
pub use chat_api::ChatApi;
pub use config::{TelegramConfig, DEFAULT_TELEGRAM_API_URL};
pub use error::TelegramApiError;
pub use types::{ApiResponse, Chat, ChatRef, Message, Update, User};

use relay_common::Secret;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: Secret<String>,
    /// Root of the Bot API, e.g. "https://api.telegram.org" or a self-hosted Bot API server.
    pub base_url: String,
}

impl TelegramConfig {
    pub fn new(token: Secret<String>) -> Self {
        Self { token, base_url: DEFAULT_TELEGRAM_API_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

use log::*;
use relay_common::Secret;

pub const DEFAULT_SELLY_API_URL: &str = "https://selly.gg/api/v2";
pub const DEFAULT_USER_AGENT: &str = "selly-relay - https://github.com/aerth/go-selly";

#[derive(Debug, Clone)]
pub struct SellyConfig {
    /// Everything up to, but excluding, the resource path. e.g. "https://selly.gg/api/v2"
    pub base_url: String,
    pub email: String,
    pub token: Secret<String>,
    pub user_agent: String,
    /// Optional proxy for all API calls, e.g. "socks5://127.0.0.1:1080"
    pub proxy: Option<String>,
}

impl Default for SellyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SELLY_API_URL.to_string(),
            email: String::default(),
            token: Secret::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl SellyConfig {
    pub fn new(email: &str, token: &str) -> Self {
        Self { email: email.to_string(), token: Secret::new(token.to_string()), ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. `var` returns the value of the named variable, if set.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let base_url = var("SELLY_API_URL").unwrap_or_else(|| DEFAULT_SELLY_API_URL.to_string());
        let email = var("EMAIL").unwrap_or_else(|| {
            debug!("🪛️ EMAIL not set. Selly API calls will not be authenticated.");
            String::default()
        });
        let token = Secret::new(var("TOKENSELLY").unwrap_or_else(|| {
            debug!("🪛️ TOKENSELLY not set. Selly API calls will not be authenticated.");
            String::default()
        }));
        let user_agent =
            var("SELLY_USER_AGENT").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let proxy = var("SELLY_PROXY").filter(|s| !s.trim().is_empty());
        if let Some(p) = &proxy {
            info!("🪛️ Selly API calls will be routed through {p}");
        }
        Self { base_url, email, token, user_agent, proxy }
    }

    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.token.is_empty()
    }
}

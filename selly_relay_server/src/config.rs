use std::env;

use chrono::Duration;
use log::*;
use relay_common::{parse_boolean_flag, Secret};
use selly_tools::SellyConfig;
use telegram_tools::{TelegramConfig, DEFAULT_TELEGRAM_API_URL};

const DEFAULT_RELAY_HOST: &str = "0.0.0.0";
const DEFAULT_BIND_ADDRESS: &str = ":8080";
const DEFAULT_DENYLIST_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The interface to listen on when the bind address only names a port (e.g. ":8080").
    pub host: String,
    /// Normalised bind address, e.g. ":8080" or "127.0.0.1:9000"
    pub bind_address: String,
    pub bot_token: Secret<String>,
    pub telegram_api_url: String,
    /// The shared secret Selly must send in the `secret` query parameter of every webhook call.
    pub secret: Secret<String>,
    /// Target chat, as a numeric id or a channel name. If absent, the chat is discovered with a `/here` message.
    pub channel: Option<String>,
    pub selly: SellyConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Maximum number of addresses kept on the denylist. Zero disables the denylist.
    pub denylist_capacity: usize,
    /// How long an address stays denied. `None` means for the lifetime of the process.
    pub denylist_ttl: Option<Duration>,
    /// Give up waiting for a `/here` message after this long. `None` waits forever.
    pub discovery_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            bot_token: Secret::default(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            secret: Secret::default(),
            channel: None,
            selly: SellyConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            denylist_capacity: DEFAULT_DENYLIST_CAPACITY,
            denylist_ttl: None,
            discovery_timeout: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. `var` returns the value of the named variable, if set.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let host = var("HOST").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_RELAY_HOST.into());
        let bind_address = normalize_bind_address(var("PORT").as_deref());
        let bot_token = Secret::new(var("TOKENTELE").unwrap_or_else(|| {
            error!("🪛️ TOKENTELE is not set. Please set it to the token of your Telegram bot.");
            String::default()
        }));
        let telegram_api_url = var("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into());
        let secret = Secret::new(var("SECRET").unwrap_or_else(|| {
            error!(
                "🪛️ SECRET is not set. The server will refuse to start until it is set to the secret configured in \
                 your Selly webhook URL."
            );
            String::default()
        }));
        let channel = var("TELECHAN").map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if channel.is_none() {
            info!("🪛️ TELECHAN is not set. Send /here in the chat that should receive notifications.");
        }
        let selly = SellyConfig::from_lookup(&var);
        let xff = "RELAY_USE_X_FORWARDED_FOR";
        let use_x_forwarded_for = parse_boolean_flag(xff, var(xff), false);
        let use_forwarded = parse_boolean_flag("RELAY_USE_FORWARDED", var("RELAY_USE_FORWARDED"), false);
        let denylist_capacity = var("DENYLIST_CAPACITY")
            .map(|s| {
                s.parse::<usize>().unwrap_or_else(|e| {
                    warn!("🪛️ Invalid value for DENYLIST_CAPACITY. {e}. Using {DEFAULT_DENYLIST_CAPACITY}");
                    DEFAULT_DENYLIST_CAPACITY
                })
            })
            .unwrap_or(DEFAULT_DENYLIST_CAPACITY);
        let denylist_ttl = optional_duration(var("DENYLIST_TTL"), "DENYLIST_TTL", Duration::try_hours);
        let discovery_timeout = optional_duration(var("DISCOVERY_TIMEOUT"), "DISCOVERY_TIMEOUT", Duration::try_seconds);
        Self {
            host,
            bind_address,
            bot_token,
            telegram_api_url,
            secret,
            channel,
            selly,
            use_x_forwarded_for,
            use_forwarded,
            denylist_capacity,
            denylist_ttl,
            discovery_timeout,
        }
    }

    /// The address handed to the listener. A bare ":port" binds on `host`.
    pub fn socket_address(&self) -> String {
        if self.bind_address.starts_with(':') {
            format!("{}{}", self.host, self.bind_address)
        } else {
            self.bind_address.clone()
        }
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig::new(self.bot_token.clone()).with_base_url(&self.telegram_api_url)
    }
}

/// Unset means ":8080", a bare number is a port (so "3000" becomes ":3000"), and anything else is used as given.
pub fn normalize_bind_address(port: Option<&str>) -> String {
    match port.map(str::trim) {
        None | Some("") => DEFAULT_BIND_ADDRESS.to_string(),
        Some(p) if p.parse::<u16>().is_ok() => format!(":{p}"),
        Some(p) => p.to_string(),
    }
}

fn optional_duration(value: Option<String>, name: &str, unit: fn(i64) -> Option<Duration>) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<i64>() {
        Ok(v) if v > 0 => unit(v).or_else(|| {
            warn!("🪛️ {name} value {v} is out of range. Ignoring it.");
            None
        }),
        Ok(_) => None,
        Err(e) => {
            warn!("🪛️ Invalid configuration value for {name}. {e}. Ignoring it.");
            None
        },
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the server configuration that request handlers need. Secrets are not included.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}

//-------------------------------------------------  WebhookSecret  ----------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct WebhookSecret(Secret<String>);

impl WebhookSecret {
    pub fn new(secret: Secret<String>) -> Self {
        Self(secret)
    }

    /// A request without a `secret` parameter never matches.
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|c| self.0.matches(c))
    }
}

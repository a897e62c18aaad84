use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use telegram_tools::{ChatApi, TelegramApi};

use crate::{
    config::{ServerConfig, ServerOptions, WebhookSecret},
    denylist::Denylist,
    discovery::{complete_discovery, resolve_configured_channel, verify_bot},
    errors::ServerError,
    notifier::{ChatTarget, Notifier},
    routes::{health, WebhookRoute},
};

/// Verifies the bot and resolves the configured channel, then serves webhooks until the server is stopped.
///
/// Setup failures are returned before anything is bound, so a bad token or channel never leaves a half-working relay.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.secret.is_empty() {
        return Err(ServerError::ConfigurationError(
            "SECRET is empty. Set it to the secret in your Selly webhook URL.".to_string(),
        ));
    }
    let telegram = TelegramApi::new(config.telegram_config()).map_err(|e| {
        ServerError::InitializeError(format!("Could not create the Telegram client. Check TOKENTELE. {e}"))
    })?;
    let bot_username = verify_bot(&telegram).await?.username;
    let known_chat = resolve_configured_channel(&telegram, config.channel.as_deref()).await?;
    if config.selly.has_credentials() {
        info!("🪛️ Selly API credentials configured for {}", config.selly.email);
    }
    let notifier = Arc::new(Notifier::new(telegram, ChatTarget::new(known_chat)));
    let srv = create_server_instance(&config, Arc::clone(&notifier))?;

    let timeout = config.discovery_timeout.and_then(|t| t.to_std().ok());
    let discovery = actix_web::rt::spawn(async move {
        match complete_discovery(notifier.as_ref(), bot_username.as_deref(), timeout).await {
            Ok(chat_id) => info!("🔭️ Channel discovery complete. Notifying chat {chat_id}"),
            Err(e) => error!("🔭️ {e}. Webhooks will be accepted, but nobody will be notified."),
        }
    });
    let result = srv.await;
    discovery.abort();
    Ok(result?)
}

pub fn create_server_instance<C>(config: &ServerConfig, notifier: Arc<Notifier<C>>) -> Result<Server, ServerError>
where C: ChatApi + Send + Sync + 'static {
    let options = ServerOptions::from_config(config);
    let secret = web::Data::new(WebhookSecret::new(config.secret.clone()));
    let ttl = config.denylist_ttl.and_then(|t| t.to_std().ok());
    let denylist = web::Data::new(Denylist::new(config.denylist_capacity, ttl));
    let notifier = web::Data::from(notifier);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("relay::access_log"))
            .app_data(web::Data::new(options))
            .app_data(secret.clone())
            .app_data(denylist.clone())
            .app_data(notifier.clone())
            .service(health)
            .service(WebhookRoute::<C>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(config.socket_address())?
    .run();
    Ok(srv)
}

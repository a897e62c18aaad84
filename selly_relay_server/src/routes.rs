//! Request handler definitions
//!
//! Define each route and its handler here.
//!
//! Handlers hold no state of their own. Everything they need (options, the webhook secret, the denylist and the
//! notifier) is registered as app data when the server is built, so tests can configure an `App` with mocks instead.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use selly_tools::Webhook;
use serde::Deserialize;
use telegram_tools::ChatApi;

use crate::{
    config::{ServerOptions, WebhookSecret},
    denylist::Denylist,
    errors::ServerError,
    helpers::get_remote_ip,
    notifier::Notifier,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Webhook  ----------------------------------------------------
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    pub secret: Option<String>,
}

route!(webhook => Post "/webhook" impl ChatApi);
pub async fn webhook<C: ChatApi>(
    req: HttpRequest,
    query: web::Query<WebhookQuery>,
    body: web::Bytes,
    options: web::Data<ServerOptions>,
    secret: web::Data<WebhookSecret>,
    denylist: web::Data<Denylist>,
    notifier: web::Data<Notifier<C>>,
) -> Result<HttpResponse, ServerError> {
    let ip = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded).ok_or_else(|| {
        warn!("🛍️ Webhook call without a usable remote address. Rejecting it.");
        ServerError::UnknownRemoteAddress
    })?;
    if denylist.contains(&ip) {
        debug!("🛍️ Dropping webhook call from denylisted address {ip}");
        return Ok(HttpResponse::Forbidden().force_close().finish());
    }
    if !secret.matches(query.secret.as_deref()) {
        warn!("🛍️ Invalid secret attempted from {ip} (Host: {})", req.connection_info().host());
        denylist.insert(ip);
        return Ok(HttpResponse::Forbidden().body("Invalid secret"));
    }
    let order = serde_json::from_slice::<Webhook>(&body).map_err(|e| {
        warn!("🛍️ Could not decode webhook payload from {ip}. {e}");
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    info!("🛍️ Webhook received for order {} ({} {})", order.id, order.value, order.currency);
    debug!("🛍️ {order:?}");
    notifier.say(&order).await;
    Ok(HttpResponse::Ok().body("200"))
}

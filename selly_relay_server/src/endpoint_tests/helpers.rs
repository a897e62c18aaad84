use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    Error,
};
use log::debug;
use relay_common::Secret;

use crate::{
    config::{ServerOptions, WebhookSecret},
    denylist::Denylist,
    notifier::{ChatTarget, Notifier},
    routes::WebhookRoute,
    test::mocks::MockTelegram,
};

pub const SECRET: &str = "correct-horse-battery-staple";
pub const CHAT_ID: i64 = -1001;
pub const WEBHOOK_JSON: &str = include_str!("../../../selly_tools/src/test_assets/webhook.json");

pub fn peer(last_octet: u8, port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(198, 51, 100, last_octet)), port)
}

/// Registers the webhook route with the given mock, sharing `denylist` with the caller.
pub fn configure(
    api: MockTelegram,
    options: ServerOptions,
    denylist: Arc<Denylist>,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let notifier = Notifier::new(api, ChatTarget::new(Some(CHAT_ID)));
        cfg.app_data(web::Data::new(options))
            .app_data(web::Data::new(WebhookSecret::new(Secret::new(SECRET.to_string()))))
            .app_data(web::Data::from(denylist))
            .app_data(web::Data::new(notifier))
            .service(WebhookRoute::<MockTelegram>::new());
    }
}

pub fn webhook_request(secret: Option<&str>, from: Option<SocketAddr>, body: &str) -> Request {
    let uri = match secret {
        Some(s) => format!("/webhook?secret={s}"),
        None => "/webhook".to_string(),
    };
    let mut req = TestRequest::post().uri(&uri).insert_header(("Content-Type", "application/json"));
    if let Some(addr) = from {
        req = req.peer_addr(addr);
    }
    req.set_payload(body.to_string()).to_request()
}

pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    debug!("Making request");
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

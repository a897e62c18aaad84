use std::{net::IpAddr, sync::Arc};

use actix_web::{http::StatusCode, test, App};

use super::helpers::{configure, peer, send, webhook_request, CHAT_ID, SECRET, WEBHOOK_JSON};
use crate::{
    config::ServerOptions,
    denylist::Denylist,
    test::mocks::{sent_message, MockTelegram},
};

fn denylist() -> Arc<Denylist> {
    Arc::new(Denylist::new(16, None))
}

#[actix_web::test]
async fn valid_webhook_is_relayed() {
    let _ = env_logger::try_init();
    let mut api = MockTelegram::new();
    api.expect_send_message()
        .withf(|chat_id, text| {
            *chat_id == CHAT_ID &&
                text.contains("3c2b1a00-5d6e-4f70-8a9b-0c1d2e3f4a5b") &&
                text.contains("Amount: 19.99 USD via PayPal")
        })
        .times(1)
        .returning(|chat_id, text| Ok(sent_message(chat_id, text)));
    let app = test::init_service(App::new().configure(configure(api, ServerOptions::default(), denylist()))).await;
    let req = webhook_request(Some(SECRET), Some(peer(1, 40000)), WEBHOOK_JSON);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "200");
}

#[actix_web::test]
async fn wrong_secret_denylists_the_caller() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let denied = denylist();
    let app = test::init_service(
        App::new().configure(configure(api, ServerOptions::default(), Arc::clone(&denied))),
    )
    .await;
    let req = webhook_request(Some("guess"), Some(peer(2, 50000)), WEBHOOK_JSON);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Invalid secret");
    assert!(denied.contains(&peer(2, 0).ip()));

    // Same host, new connection from another port: silently dropped
    let req = webhook_request(Some("guess-again"), Some(peer(2, 50001)), WEBHOOK_JSON);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
    assert_eq!(denied.len(), 1);
}

#[actix_web::test]
async fn missing_secret_is_rejected() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let app = test::init_service(App::new().configure(configure(api, ServerOptions::default(), denylist()))).await;
    let req = webhook_request(None, Some(peer(3, 40000)), WEBHOOK_JSON);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Invalid secret");
}

#[actix_web::test]
async fn denylisted_caller_is_dropped_even_with_the_right_secret() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let denied = denylist();
    denied.insert(peer(4, 0).ip());
    let app = test::init_service(
        App::new().configure(configure(api, ServerOptions::default(), Arc::clone(&denied))),
    )
    .await;
    let req = webhook_request(Some(SECRET), Some(peer(4, 40000)), WEBHOOK_JSON);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn malformed_payload_is_rejected() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let denied = denylist();
    let app = test::init_service(
        App::new().configure(configure(api, ServerOptions::default(), Arc::clone(&denied))),
    )
    .await;
    let req = webhook_request(Some(SECRET), Some(peer(5, 40000)), "{\"id\": ");
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("{\"error\":"), "Unexpected body: {body}");
    // A bad payload is not a bad secret
    assert!(denied.is_empty());
}

#[actix_web::test]
async fn request_without_remote_address_is_rejected() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let app = test::init_service(App::new().configure(configure(api, ServerOptions::default(), denylist()))).await;
    let req = webhook_request(Some(SECRET), None, WEBHOOK_JSON);
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn forwarded_address_is_denylisted_when_trusted() {
    let mut api = MockTelegram::new();
    api.expect_send_message().never();
    let denied = denylist();
    let options = ServerOptions { use_x_forwarded_for: true, use_forwarded: false };
    let app = test::init_service(App::new().configure(configure(api, options, Arc::clone(&denied)))).await;
    let req = test::TestRequest::post()
        .uri("/webhook?secret=nope")
        .insert_header(("X-Forwarded-For", "192.0.2.77, 10.0.0.1"))
        .peer_addr(peer(6, 40000))
        .set_payload(WEBHOOK_JSON)
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(denied.contains(&"192.0.2.77".parse::<IpAddr>().unwrap()));
    assert!(!denied.contains(&peer(6, 0).ip()));
}

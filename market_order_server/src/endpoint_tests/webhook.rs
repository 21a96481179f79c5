use actix_web::{http::StatusCode, test, web, App};
use checkout_client::signature::{sign, SIGNATURE_HEADER};
use market_order_engine::{
    db_types::PaymentStatus,
    traits::SettleOutcome,
    WebhookReconciler,
};
use mkt_common::Secret;
use serde_json::Value;

use super::mocks::{sample_order, MockStore};
use crate::{middleware::SignatureMiddlewareFactory, routes::CheckoutWebhookRoute};

const WEBHOOK_SECRET: &str = "whsec_endpoint_test";
const TIMESTAMP: i64 = 1_700_000_000;

fn completed_event_body(order_ref: &str) -> String {
    format!(
        r#"{{"id":"evt_1","type":"checkout.session.completed","data":{{"object":{{"id":"cs_test_1","client_reference_id":"{order_ref}"}}}}}}"#
    )
}

async fn webhook_request(
    body: &str,
    signature: Option<String>,
    checks_enabled: bool,
    store: MockStore,
) -> (StatusCode, String) {
    let app = test::init_service(
        App::new().app_data(web::Data::new(WebhookReconciler::new(store))).service(
            web::scope("/webhook")
                .wrap(SignatureMiddlewareFactory::new(Secret::new(WEBHOOK_SECRET.to_string()), checks_enabled))
                .service(CheckoutWebhookRoute::<MockStore>::new()),
        ),
    )
    .await;
    let mut req = test::TestRequest::post()
        .uri("/webhook/checkout")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).to_string())
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

#[actix_web::test]
async fn an_unsigned_delivery_is_rejected_before_parsing() {
    let _ = env_logger::try_init().ok();
    // No store expectations: the mock panics if the handler is ever reached
    let (status, body) = webhook_request(&completed_event_body("1"), None, true, MockStore::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
}

#[actix_web::test]
async fn a_tampered_payload_is_rejected_whatever_it_contains() {
    let _ = env_logger::try_init().ok();
    let signed = sign(WEBHOOK_SECRET, TIMESTAMP, completed_event_body("1").as_bytes());
    let tampered = completed_event_body("2");
    let (status, _) = webhook_request(&tampered, Some(signed), true, MockStore::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn a_valid_delivery_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let body = completed_event_body("1");
    let signature = sign(WEBHOOK_SECRET, TIMESTAMP, body.as_bytes());
    let mut store = MockStore::new();
    store
        .expect_settle_payment()
        .withf(|id, session_id, outcome| {
            id.value() == 1 && session_id == "cs_test_1" && *outcome == PaymentStatus::Paid
        })
        .times(1)
        .returning(|_, _, _| {
            let mut order = sample_order(1);
            order.payment_status = PaymentStatus::Paid;
            Ok(SettleOutcome::Applied(order))
        });
    let (status, response) = webhook_request(&body, Some(signature), true, store).await;
    assert_eq!(status, StatusCode::OK, "body: {response}");
    let ack: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(ack["received"], true);
}

#[actix_web::test]
async fn a_redelivered_event_still_acknowledges() {
    let _ = env_logger::try_init().ok();
    let body = completed_event_body("1");
    let signature = sign(WEBHOOK_SECRET, TIMESTAMP, body.as_bytes());
    let mut store = MockStore::new();
    store.expect_settle_payment().returning(|_, _, _| {
        let mut order = sample_order(1);
        order.payment_status = PaymentStatus::Paid;
        Ok(SettleOutcome::AlreadySettled(order))
    });
    let (status, response) = webhook_request(&body, Some(signature), true, store).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(ack["received"], true);
}

#[actix_web::test]
async fn an_event_for_an_unknown_order_acknowledges_without_effect() {
    let _ = env_logger::try_init().ok();
    let body = completed_event_body("9999");
    let signature = sign(WEBHOOK_SECRET, TIMESTAMP, body.as_bytes());
    let mut store = MockStore::new();
    store.expect_settle_payment().returning(|_, _, _| Ok(SettleOutcome::OrderMissing));
    let (status, response) = webhook_request(&body, Some(signature), true, store).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(ack["received"], true);
}

#[actix_web::test]
async fn an_unparseable_but_correctly_signed_payload_still_acks() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"hello": "world"}"#;
    let signature = sign(WEBHOOK_SECRET, TIMESTAMP, body.as_bytes());
    let (status, response) = webhook_request(body, Some(signature), true, MockStore::new()).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(ack["success"], false);
}

#[actix_web::test]
async fn irrelevant_event_types_are_acknowledged_without_store_access() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"id":"evt_9","type":"invoice.created","data":{"object":{"id":"cs_9"}}}"#;
    let signature = sign(WEBHOOK_SECRET, TIMESTAMP, body.as_bytes());
    let (status, response) = webhook_request(body, Some(signature), true, MockStore::new()).await;
    assert_eq!(status, StatusCode::OK, "body: {response}");
}

#[actix_web::test]
async fn disabled_signature_checks_let_unsigned_deliveries_through() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_settle_payment().returning(|_, _, _| Ok(SettleOutcome::OrderMissing));
    let (status, _) = webhook_request(&completed_event_body("1"), None, false, store).await;
    assert_eq!(status, StatusCode::OK);
}

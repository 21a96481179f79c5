use actix_web::{
    http::StatusCode,
    web::{self, ServiceConfig},
};
use market_order_engine::{
    db_types::{PaymentStatus, Role},
    traits::{CheckoutProviderError, HostedCheckout},
    PaymentFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{issue_token, post_request},
    mocks::{sample_order, MockProvider, MockStore},
};
use crate::{auth::JwtClaims, routes::InitiatePaymentRoute};

fn token(sub: i64, role: Role) -> String {
    issue_token(JwtClaims { sub, role })
}

fn configure_with(store: MockStore, provider: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentFlowApi::new(store, provider);
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api/orders").service(InitiatePaymentRoute::<MockStore, MockProvider>::new()),
        );
    }
}

fn store_with_order(id: i64) -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(move |_| Ok(Some(sample_order(id))));
    store
}

#[actix_web::test]
async fn the_buyer_initiates_payment_and_gets_a_redirect() {
    let _ = env_logger::try_init().ok();
    let mut store = store_with_order(1);
    store.expect_record_checkout_session().returning(|_, _| Ok(sample_order(1)));
    let mut provider = MockProvider::new();
    provider
        .expect_create_session()
        .withf(|_, name, unit_amount, quantity| name == "Mechanical keyboard" && *unit_amount == 1999 && *quantity == 2)
        .returning(|_, _, _, _| {
            Ok(HostedCheckout {
                session_id: "cs_test_1".to_string(),
                redirect_url: "https://checkout.example.com/pay/cs_test_1".to_string(),
            })
        });
    let (status, body) =
        post_request(&token(42, Role::Buyer), "/api/orders/1/pay", json!({}), configure_with(store, provider)).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    let init: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(init["paymentUrl"], "https://checkout.example.com/pay/cs_test_1");
    assert_eq!(init["paymentStatus"], serde_json::to_value(PaymentStatus::Pending).unwrap());
}

#[actix_web::test]
async fn admins_cannot_pay_for_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_request(
        &token(1, Role::Admin),
        "/api/orders/1/pay",
        json!({}),
        configure_with(store_with_order(1), MockProvider::new()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn paying_for_a_missing_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, _) =
        post_request(&token(42, Role::Buyer), "/api/orders/404/pay", json!({}), configure_with(store, MockProvider::new()))
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_provider_failure_is_a_bad_gateway_and_mutates_nothing() {
    let _ = env_logger::try_init().ok();
    // No record_checkout_session expectation: the mock panics if the handler tries to persist
    let store = store_with_order(1);
    let mut provider = MockProvider::new();
    provider.expect_create_session().returning(|_, _, _, _| {
        Err(CheckoutProviderError::SessionCreation("the provider is on fire".to_string()))
    });
    let (status, body) =
        post_request(&token(42, Role::Buyer), "/api/orders/1/pay", json!({}), configure_with(store, provider)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "body: {body}");
}

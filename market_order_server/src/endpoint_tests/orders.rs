use actix_web::{
    http::StatusCode,
    web::{self, ServiceConfig},
};
use market_order_engine::{db_types::Role, OrderFlowApi};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, issue_token, post_request, put_request},
    mocks::{keyboard_product, sample_order, MockCatalog, MockStore},
};
use crate::{
    auth::JwtClaims,
    routes::{MyOrdersRoute, OrderByIdRoute, PlaceOrderRoute, UpdateOrderStatusRoute},
};

fn token(sub: i64, role: Role) -> String {
    issue_token(JwtClaims { sub, role })
}

fn configure_with(store: MockStore, catalog: MockCatalog) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(store, catalog);
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api/orders")
                .service(PlaceOrderRoute::<MockStore, MockCatalog>::new())
                .service(MyOrdersRoute::<MockStore, MockCatalog>::new())
                .service(OrderByIdRoute::<MockStore, MockCatalog>::new())
                .service(UpdateOrderStatusRoute::<MockStore, MockCatalog>::new()),
        );
    }
}

fn store_with_order(id: i64) -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(move |_| Ok(Some(sample_order(id))));
    store
}

#[actix_web::test]
async fn fetching_an_order_without_a_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("", "/api/orders/1", configure_with(MockStore::new(), MockCatalog::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_buyer_fetches_their_own_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&token(42, Role::Buyer), "/api/orders/1", configure_with(store_with_order(1), MockCatalog::new()))
            .await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["buyerId"], 42);
    assert_eq!(order["totalAmount"], "39.98");
}

#[actix_web::test]
async fn another_buyer_is_denied_not_told_it_is_missing() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&token(43, Role::Buyer), "/api/orders/1", configure_with(store_with_order(1), MockCatalog::new()))
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "body: {body}");
}

#[actix_web::test]
async fn a_missing_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, _) = get_request(&token(42, Role::Buyer), "/api/orders/999", configure_with(store, MockCatalog::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn placing_an_order_returns_the_snapshot() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_insert_order().returning(|_| Ok(sample_order(1)));
    let mut catalog = MockCatalog::new();
    catalog.expect_product_by_id().returning(|_, _| Ok(keyboard_product()));
    let (status, body) = post_request(
        &token(42, Role::Buyer),
        "/api/orders",
        json!({"productId": 1, "quantity": 2}),
        configure_with(store, catalog),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["totalAmount"], "39.98");
    assert_eq!(order["orderStatus"], "PLACED");
    assert_eq!(order["paymentStatus"], "PENDING");
}

#[actix_web::test]
async fn sellers_and_admins_cannot_place_orders() {
    let _ = env_logger::try_init().ok();
    for role in [Role::Seller, Role::Admin] {
        let (status, _) = post_request(
            &token(9, role),
            "/api/orders",
            json!({"productId": 1, "quantity": 1}),
            configure_with(MockStore::new(), MockCatalog::new()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[actix_web::test]
async fn insufficient_stock_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let mut catalog = MockCatalog::new();
    catalog.expect_product_by_id().returning(|_, _| Ok(keyboard_product()));
    let (status, body) = post_request(
        &token(42, Role::Buyer),
        "/api/orders",
        json!({"productId": 1, "quantity": 6}),
        configure_with(MockStore::new(), catalog),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "body: {body}");
}

#[actix_web::test]
async fn non_positive_quantity_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_request(
        &token(42, Role::Buyer),
        "/api/orders",
        json!({"productId": 1, "quantity": 0}),
        configure_with(MockStore::new(), MockCatalog::new()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn my_orders_lists_only_the_callers_orders() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_fetch_orders_for_buyer()
        .withf(|buyer_id| *buyer_id == 42)
        .returning(|_| Ok(vec![sample_order(1), sample_order(2)]));
    let (status, body) =
        get_request(&token(42, Role::Buyer), "/api/orders/my-orders", configure_with(store, MockCatalog::new())).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    let orders: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn non_admins_cannot_update_status_whatever_the_target() {
    let _ = env_logger::try_init().ok();
    for role in [Role::Buyer, Role::Seller] {
        let (status, _) = put_request(
            &token(42, role),
            "/api/orders/1/status",
            json!({"orderStatus": "SHIPPED"}),
            configure_with(MockStore::new(), MockCatalog::new()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[actix_web::test]
async fn an_admin_ships_an_order() {
    let _ = env_logger::try_init().ok();
    let mut store = store_with_order(1);
    store.expect_update_order_status().returning(|_, status| {
        let mut order = sample_order(1);
        order.order_status = status;
        Ok(order)
    });
    let (status, body) = put_request(
        &token(1, Role::Admin),
        "/api/orders/1/status",
        json!({"orderStatus": "SHIPPED"}),
        configure_with(store, MockCatalog::new()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["orderStatus"], "SHIPPED");
}

#[actix_web::test]
async fn an_unknown_status_name_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (status, _) = put_request(
        &token(1, Role::Admin),
        "/api/orders/1/status",
        json!({"orderStatus": "REFUNDED"}),
        configure_with(MockStore::new(), MockCatalog::new()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

mod support;

use market_order_engine::{
    db_types::{OrderId, OrderStatus, PaymentStatus, Role},
    order_objects::NewOrderRequest,
    OrderFlowApi,
    OrderFlowError,
};
use mkt_common::Money;
use support::{keyboard_product, prepare_store, TestCatalog};

const BUYER: i64 = 42;
const OTHER_BUYER: i64 = 43;
const SELLER: i64 = 7;
const ADMIN: i64 = 1;

fn request(quantity: i64) -> NewOrderRequest {
    NewOrderRequest { product_id: 1, quantity }
}

async fn api_with_keyboard() -> OrderFlowApi<market_order_engine::SqliteOrderStore, TestCatalog> {
    let store = prepare_store().await;
    OrderFlowApi::new(store, TestCatalog::with_product(keyboard_product()))
}

#[tokio::test]
async fn placing_an_order_snapshots_the_product() {
    let api = api_with_keyboard().await;
    let order = api.place_order(BUYER, request(2), "buyer-token").await.expect("placement failed");
    assert_eq!(order.total_amount, Money::from_minor(3998));
    assert_eq!(order.quantity, 2);
    assert_eq!(order.buyer_id, BUYER);
    assert_eq!(order.seller_id, SELLER);
    assert_eq!(order.product_id, 1);
    assert_eq!(order.product_name, "Mechanical keyboard");
    assert_eq!(order.order_status, OrderStatus::Placed);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.created_at, order.updated_at);
}

#[tokio::test]
async fn insufficient_stock_creates_no_order() {
    let api = api_with_keyboard().await;
    let err = api.place_order(BUYER, request(6), "buyer-token").await.expect_err("expected stock rejection");
    assert!(matches!(err, OrderFlowError::InsufficientStock { requested: 6, available: 5, .. }), "got {err}");
    assert!(api.orders_for_buyer(BUYER).await.unwrap().is_empty());
}

#[tokio::test]
async fn exact_stock_is_accepted() {
    let api = api_with_keyboard().await;
    let order = api.place_order(BUYER, request(5), "buyer-token").await.expect("placement failed");
    assert_eq!(order.total_amount, Money::from_minor(9995));
}

#[tokio::test]
async fn non_positive_quantity_is_rejected_before_the_catalog_is_called() {
    let store = prepare_store().await;
    let catalog = TestCatalog::with_product(keyboard_product());
    // With the catalog down, a ValidationError proves the remote call never happened
    catalog.set_down(true);
    let api = OrderFlowApi::new(store, catalog);
    for quantity in [0, -1] {
        let err = api.place_order(BUYER, request(quantity), "t").await.expect_err("expected rejection");
        assert!(matches!(err, OrderFlowError::ValidationError(_)), "got {err}");
    }
}

#[tokio::test]
async fn catalog_outage_fails_placement_and_leaves_no_trace() {
    let store = prepare_store().await;
    let catalog = TestCatalog::with_product(keyboard_product());
    catalog.set_down(true);
    let api = OrderFlowApi::new(store, catalog);
    let err = api.place_order(BUYER, request(1), "t").await.expect_err("expected outage error");
    assert!(matches!(err, OrderFlowError::CatalogUnavailable(_)), "got {err}");
    assert!(api.orders_for_buyer(BUYER).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let api = api_with_keyboard().await;
    let err = api
        .place_order(BUYER, NewOrderRequest { product_id: 999, quantity: 1 }, "t")
        .await
        .expect_err("expected not found");
    assert!(matches!(err, OrderFlowError::ProductNotFound(999)), "got {err}");
}

#[tokio::test]
async fn visibility_follows_the_policy_matrix() {
    let api = api_with_keyboard().await;
    let placed = api.place_order(BUYER, request(1), "t").await.unwrap();
    let id = placed.id;

    assert!(api.order_by_id(&id, BUYER, Role::Buyer).await.is_ok());
    assert!(api.order_by_id(&id, SELLER, Role::Seller).await.is_ok());
    assert!(api.order_by_id(&id, ADMIN, Role::Admin).await.is_ok());

    let err = api.order_by_id(&id, OTHER_BUYER, Role::Buyer).await.expect_err("expected denial");
    assert!(matches!(err, OrderFlowError::AccessDenied(_)), "got {err}");
    let err = api.order_by_id(&id, 8, Role::Seller).await.expect_err("expected denial");
    assert!(matches!(err, OrderFlowError::AccessDenied(_)), "got {err}");
}

#[tokio::test]
async fn a_missing_order_is_not_found_not_denied() {
    let api = api_with_keyboard().await;
    let err = api.order_by_id(&OrderId(9999), BUYER, Role::Buyer).await.expect_err("expected not found");
    assert!(matches!(err, OrderFlowError::OrderNotFound(OrderId(9999))), "got {err}");
}

#[tokio::test]
async fn listing_returns_the_buyers_orders_in_insertion_order() {
    let api = api_with_keyboard().await;
    let first = api.place_order(BUYER, request(1), "t").await.unwrap();
    let second = api.place_order(BUYER, request(2), "t").await.unwrap();
    api.place_order(OTHER_BUYER, request(1), "t").await.unwrap();

    let orders = api.orders_for_buyer(BUYER).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, first.id);
    assert_eq!(orders[1].id, second.id);
}

#[tokio::test]
async fn only_admins_change_order_status() {
    let api = api_with_keyboard().await;
    let order = api.place_order(BUYER, request(1), "t").await.unwrap();
    for role in [Role::Buyer, Role::Seller] {
        let err = api.update_order_status(&order.id, "SHIPPED", role).await.expect_err("expected denial");
        assert!(matches!(err, OrderFlowError::AccessDenied(_)), "got {err}");
    }
    let updated = api.update_order_status(&order.id, "SHIPPED", Role::Admin).await.unwrap();
    assert_eq!(updated.order_status, OrderStatus::Shipped);
}

#[tokio::test]
async fn status_names_are_case_insensitive_and_validated() {
    let api = api_with_keyboard().await;
    let order = api.place_order(BUYER, request(1), "t").await.unwrap();

    let err = api.update_order_status(&order.id, "", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::ValidationError(_)), "got {err}");
    let err = api.update_order_status(&order.id, "  ", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::ValidationError(_)), "got {err}");
    let err = api.update_order_status(&order.id, "REFUNDED", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::ValidationError(_)), "got {err}");

    let updated = api.update_order_status(&order.id, "shipped", Role::Admin).await.unwrap();
    assert_eq!(updated.order_status, OrderStatus::Shipped);
}

#[tokio::test]
async fn the_transition_table_is_enforced() {
    let api = api_with_keyboard().await;
    let order = api.place_order(BUYER, request(1), "t").await.unwrap();

    // Placed -> Delivered skips Shipped
    let err = api.update_order_status(&order.id, "DELIVERED", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::OrderModificationForbidden { .. }), "got {err}");

    api.update_order_status(&order.id, "SHIPPED", Role::Admin).await.unwrap();
    // Re-requesting the current status is a no-op, not a success
    let err = api.update_order_status(&order.id, "SHIPPED", Role::Admin).await.expect_err("expected no-op");
    assert!(matches!(err, OrderFlowError::OrderModificationNoOp), "got {err}");
    // No moving backwards
    let err = api.update_order_status(&order.id, "PLACED", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::OrderModificationForbidden { .. }), "got {err}");

    api.update_order_status(&order.id, "DELIVERED", Role::Admin).await.unwrap();
    // Delivered is terminal
    let err = api.update_order_status(&order.id, "CANCELLED", Role::Admin).await.expect_err("expected rejection");
    assert!(matches!(err, OrderFlowError::OrderModificationForbidden { .. }), "got {err}");
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found() {
    let api = api_with_keyboard().await;
    let err = api.update_order_status(&OrderId(777), "SHIPPED", Role::Admin).await.expect_err("expected not found");
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)), "got {err}");
}

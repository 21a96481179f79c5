mod support;

use market_order_engine::{
    db_types::{OrderId, OrderStatus, PaymentStatus, Role},
    order_objects::NewOrderRequest,
    OrderFlowApi,
    OrderFlowError,
    PaymentEvent,
    PaymentFlowApi,
    SqliteOrderStore,
    WebhookReconciler,
};
use mkt_common::Money;
use support::{keyboard_product, prepare_store, TestCatalog, TestProvider};

const BUYER: i64 = 42;
const SELLER: i64 = 7;
const ADMIN: i64 = 1;

struct Harness {
    orders: OrderFlowApi<SqliteOrderStore, TestCatalog>,
    payments: PaymentFlowApi<SqliteOrderStore, TestProvider>,
    reconciler: WebhookReconciler<SqliteOrderStore>,
    provider: TestProvider,
}

async fn harness() -> Harness {
    let store = prepare_store().await;
    let provider = TestProvider::default();
    Harness {
        orders: OrderFlowApi::new(store.clone(), TestCatalog::with_product(keyboard_product())),
        payments: PaymentFlowApi::new(store.clone(), provider.clone()),
        reconciler: WebhookReconciler::new(store),
        provider,
    }
}

impl Harness {
    async fn place(&self, quantity: i64) -> OrderId {
        self.orders
            .place_order(BUYER, NewOrderRequest { product_id: 1, quantity }, "t")
            .await
            .expect("placement failed")
            .id
    }

    async fn payment_status(&self, id: &OrderId) -> PaymentStatus {
        self.orders.order_by_id(id, ADMIN, Role::Admin).await.unwrap().payment_status
    }
}

fn completed(event_id: &str, session_id: &str, order_ref: Option<&str>) -> PaymentEvent {
    PaymentEvent::CheckoutCompleted {
        event_id: event_id.to_string(),
        session_id: session_id.to_string(),
        order_ref: order_ref.map(String::from),
    }
}

fn failed(event_id: &str, session_id: &str, order_ref: Option<&str>) -> PaymentEvent {
    PaymentEvent::CheckoutFailed {
        event_id: event_id.to_string(),
        session_id: session_id.to_string(),
        order_ref: order_ref.map(String::from),
    }
}

#[tokio::test]
async fn initiating_payment_returns_a_redirect_and_stays_pending() {
    let h = harness().await;
    let id = h.place(2).await;
    let init = h.payments.initiate_payment(&id, BUYER).await.expect("initiation failed");
    assert!(init.payment_url.contains("cs_test_0"), "unexpected url {}", init.payment_url);
    assert_eq!(init.payment_status, PaymentStatus::Pending);
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Pending);
}

#[tokio::test]
async fn only_the_buyer_may_initiate_payment() {
    let h = harness().await;
    let id = h.place(1).await;
    // The admin is denied too; payment authority does not follow from the admin role
    for actor in [ADMIN, SELLER, 999] {
        let err = h.payments.initiate_payment(&id, actor).await.expect_err("expected denial");
        assert!(matches!(err, OrderFlowError::AccessDenied(_)), "got {err}");
    }
}

#[tokio::test]
async fn paying_a_missing_order_is_not_found() {
    let h = harness().await;
    let err = h.payments.initiate_payment(&OrderId(404), BUYER).await.expect_err("expected not found");
    assert!(matches!(err, OrderFlowError::OrderNotFound(_)), "got {err}");
}

#[tokio::test]
async fn provider_failure_leaves_the_order_untouched() {
    let h = harness().await;
    let id = h.place(1).await;
    h.provider.set_failing(true);
    let err = h.payments.initiate_payment(&id, BUYER).await.expect_err("expected provider error");
    assert!(matches!(err, OrderFlowError::PaymentProviderError(_)), "got {err}");
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Pending);

    // With no session ever recorded, even a correctly-referenced completion event must not
    // mark the order paid
    let ack = h.reconciler.handle_event(completed("evt_1", "cs_forged", Some("1"))).await.unwrap();
    assert!(ack.received);
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Pending);
}

#[tokio::test]
async fn completed_webhook_marks_paid_idempotently() {
    let h = harness().await;
    let id = h.place(2).await;
    h.payments.initiate_payment(&id, BUYER).await.unwrap();

    let order_ref = id.value().to_string();
    let event = completed("evt_1", "cs_test_0", Some(&order_ref));
    let ack = h.reconciler.handle_event(event.clone()).await.unwrap();
    assert!(ack.received);
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Paid);

    // At-least-once delivery: the exact same event arrives again
    let ack = h.reconciler.handle_event(event).await.unwrap();
    assert!(ack.received);
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Paid);
}

#[tokio::test]
async fn unmatchable_events_are_acknowledged_without_effect() {
    let h = harness().await;
    let id = h.place(1).await;
    h.payments.initiate_payment(&id, BUYER).await.unwrap();

    for event in [
        completed("evt_1", "cs_test_0", Some("9999")),
        completed("evt_2", "cs_test_0", None),
        completed("evt_3", "cs_test_0", Some("not-an-id")),
    ] {
        let ack = h.reconciler.handle_event(event).await.unwrap();
        assert!(ack.received);
    }
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Pending);
}

#[tokio::test]
async fn irrelevant_event_types_are_acknowledged() {
    let h = harness().await;
    let ack = h
        .reconciler
        .handle_event(PaymentEvent::Other {
            event_id: "evt_1".to_string(),
            event_type: "invoice.created".to_string(),
        })
        .await
        .unwrap();
    assert!(ack.received);
}

#[tokio::test]
async fn failure_events_settle_pending_orders_but_never_unseat_paid() {
    let h = harness().await;
    let id = h.place(1).await;
    let order_ref = id.value().to_string();

    h.payments.initiate_payment(&id, BUYER).await.unwrap();
    h.reconciler.handle_event(failed("evt_1", "cs_test_0", Some(&order_ref))).await.unwrap();
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Failed);

    // A late completion for the failed session does not resurrect it
    h.reconciler.handle_event(completed("evt_2", "cs_test_0", Some(&order_ref))).await.unwrap();
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Failed);

    // A fresh checkout attempt resets to Pending, and its session can settle as paid
    h.payments.initiate_payment(&id, BUYER).await.unwrap();
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Pending);
    h.reconciler.handle_event(completed("evt_3", "cs_test_1", Some(&order_ref))).await.unwrap();
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Paid);

    // And once paid, a stray failure event changes nothing
    h.reconciler.handle_event(failed("evt_4", "cs_test_1", Some(&order_ref))).await.unwrap();
    assert_eq!(h.payment_status(&id).await, PaymentStatus::Paid);
}

#[tokio::test]
async fn the_worked_scenario_end_to_end() {
    // product 19.99 with 5 in stock; buyer orders 2; admin ships; buyer pays; webhook settles
    let h = harness().await;
    let order = h
        .orders
        .place_order(BUYER, NewOrderRequest { product_id: 1, quantity: 2 }, "t")
        .await
        .unwrap();
    assert_eq!(order.total_amount, Money::from_minor(3998));
    assert_eq!(order.order_status, OrderStatus::Placed);
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    let shipped = h.orders.update_order_status(&order.id, "SHIPPED", Role::Admin).await.unwrap();
    assert_eq!(shipped.order_status, OrderStatus::Shipped);

    let init = h.payments.initiate_payment(&order.id, BUYER).await.unwrap();
    assert_eq!(init.payment_status, PaymentStatus::Pending);
    assert!(!init.payment_url.is_empty());

    let order_ref = order.id.value().to_string();
    h.reconciler.handle_event(completed("evt_1", "cs_test_0", Some(&order_ref))).await.unwrap();

    let settled = h.orders.order_by_id(&order.id, ADMIN, Role::Admin).await.unwrap();
    // The axes are independent: settling payment does not move the fulfilment status
    assert_eq!(settled.order_status, OrderStatus::Shipped);
    assert_eq!(settled.payment_status, PaymentStatus::Paid);
    assert_eq!(settled.total_amount, Money::from_minor(3998));
}

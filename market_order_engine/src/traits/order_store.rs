use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentStatus};

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// Outcome of applying a webhook-reported payment result to an order. The reconciler turns all
/// of these into a successful acknowledgment; they differ only in what gets logged and whether
/// state moved.
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    /// The payment status was changed and the updated order is returned.
    Applied(Order),
    /// The order was already in a terminal payment state; nothing changed. Redelivered events
    /// land here.
    AlreadySettled(Order),
    /// No checkout session with that id was ever recorded for this order, so the transition is
    /// refused.
    SessionUnknown,
    /// The referenced order does not exist.
    OrderMissing,
}

/// Durable storage of order records. All mutations are single-row, guarded read-modify-write
/// cycles, so concurrent updates to disjoint fields of the same order cannot clobber each other.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Persist a new order snapshot, assigning its id. Status columns start at
    /// `Placed`/`Pending`, the only legal initial pair.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// All orders placed by the given buyer, in insertion order, fully materialized.
    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderStoreError>;

    /// Set the fulfilment status. The caller is responsible for having validated the transition.
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, OrderStoreError>;

    /// Record a newly created provider session against the order and re-assert
    /// `payment_status = Pending` (a no-op unless a previous attempt failed; `Paid` is never
    /// regressed). Returns the order as persisted afterwards.
    async fn record_checkout_session(&self, id: &OrderId, session_id: &str) -> Result<Order, OrderStoreError>;

    /// Apply a provider-reported payment outcome (`Paid` or `Failed`) for the given session.
    /// Idempotent: repeat deliveries return [`SettleOutcome::AlreadySettled`].
    async fn settle_payment(
        &self,
        id: &OrderId,
        session_id: &str,
        outcome: PaymentStatus,
    ) -> Result<SettleOutcome, OrderStoreError>;
}

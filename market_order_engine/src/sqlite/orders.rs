//! Low-level order queries.
//!
//! Simple functions over a `&mut SqliteConnection` rather than stateful structs, so callers can
//! run them against a pooled connection or embed them in a transaction (`&mut *tx`) as needed.
//! Timestamps are always bound explicitly by the caller side of the engine; the schema has no
//! triggers.

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentStatus},
    traits::OrderStoreError,
};

/// Inserts a new order snapshot. Both status columns start at their only legal initial values,
/// and `updated_at` starts equal to `created_at`.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                buyer_id,
                seller_id,
                product_id,
                product_name,
                quantity,
                total_amount,
                order_status,
                payment_status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.product_id)
    .bind(order.product_name)
    .bind(order.quantity)
    .bind(order.total_amount.value())
    .bind(OrderStatus::Placed.to_string())
    .bind(PaymentStatus::Pending.to_string())
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} inserted for buyer {}", order.id, order.buyer_id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.value()).fetch_optional(conn).await
}

/// All orders for the buyer, in insertion order.
pub async fn fetch_orders_for_buyer(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY id ASC")
        .bind(buyer_id)
        .fetch_all(conn)
        .await
}

/// Sets the fulfilment status in a single guarded statement; only the status column and
/// `updated_at` are touched, so a concurrent payment-status write cannot be clobbered.
pub async fn update_order_status(
    id: &OrderId,
    status: OrderStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("UPDATE orders SET order_status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(status.to_string())
        .bind(now)
        .bind(id.value())
        .fetch_optional(conn)
        .await
}

pub async fn insert_checkout_session(
    id: &OrderId,
    session_id: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO checkout_sessions (session_id, order_id, created_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(id.value())
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn session_recorded(
    id: &OrderId,
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM checkout_sessions WHERE order_id = $1 AND session_id = $2")
            .bind(id.value())
            .bind(session_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Re-asserts `Pending` ahead of a fresh checkout attempt. `Paid` is never regressed; a
/// previously `Failed` order becomes payable again.
pub async fn reassert_payment_pending(
    id: &OrderId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET payment_status = $1, updated_at = $2 WHERE id = $3 AND payment_status <> $4",
    )
    .bind(PaymentStatus::Pending.to_string())
    .bind(now)
    .bind(id.value())
    .bind(PaymentStatus::Paid.to_string())
    .execute(conn)
    .await?;
    Ok(())
}

/// Applies a terminal payment outcome, guarded on the current status still being `Pending`.
/// Returns `None` when the guard fails, i.e. another delivery got there first.
pub async fn apply_payment_outcome(
    id: &OrderId,
    outcome: PaymentStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = $2 WHERE id = $3 AND payment_status = $4 RETURNING *",
    )
    .bind(outcome.to_string())
    .bind(now)
    .bind(id.value())
    .bind(PaymentStatus::Pending.to_string())
    .fetch_optional(conn)
    .await
}

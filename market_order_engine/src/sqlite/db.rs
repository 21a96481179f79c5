use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use super::orders;
use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentStatus},
    traits::{OrderStore, OrderStoreError, SettleOutcome},
};

/// SQLite-backed implementation of [`OrderStore`].
#[derive(Clone)]
pub struct SqliteOrderStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteOrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteOrderStore ({:?})", self.pool)
    }
}

impl SqliteOrderStore {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, OrderStoreError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Applies the embedded schema migrations. Run once at startup.
    pub async fn migrate(&self) -> Result<(), OrderStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| OrderStoreError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderStore for SqliteOrderStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_id(id, &mut conn).await?)
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_buyer(buyer_id, &mut conn).await?)
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(id, status, Utc::now(), &mut conn).await?;
        order.ok_or(OrderStoreError::OrderNotFound(*id))
    }

    /// Stores the session in the ledger and re-asserts `Pending`, atomically with respect to any
    /// concurrent settlement of the same order.
    async fn record_checkout_session(&self, id: &OrderId, session_id: &str) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        if orders::fetch_order_by_id(id, &mut tx).await?.is_none() {
            return Err(OrderStoreError::OrderNotFound(*id));
        }
        orders::insert_checkout_session(id, session_id, now, &mut tx).await?;
        orders::reassert_payment_pending(id, now, &mut tx).await?;
        let order = orders::fetch_order_by_id(id, &mut tx)
            .await?
            .ok_or(OrderStoreError::OrderNotFound(*id))?;
        tx.commit().await?;
        debug!("🗃️ Session {session_id} recorded against order {id}");
        Ok(order)
    }

    async fn settle_payment(
        &self,
        id: &OrderId,
        session_id: &str,
        outcome: PaymentStatus,
    ) -> Result<SettleOutcome, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::fetch_order_by_id(id, &mut tx).await? else {
            return Ok(SettleOutcome::OrderMissing);
        };
        if !orders::session_recorded(id, session_id, &mut tx).await? {
            return Ok(SettleOutcome::SessionUnknown);
        }
        if order.payment_status != PaymentStatus::Pending {
            // Paid and Failed are terminal for webhook-driven transitions. A failed order only
            // becomes payable again through a fresh checkout attempt, which resets it to
            // Pending.
            return Ok(SettleOutcome::AlreadySettled(order));
        }
        let result = match orders::apply_payment_outcome(id, outcome, Utc::now(), &mut tx).await? {
            Some(updated) => SettleOutcome::Applied(updated),
            // The guard lost a race with a concurrent delivery
            None => match orders::fetch_order_by_id(id, &mut tx).await? {
                Some(current) => SettleOutcome::AlreadySettled(current),
                None => SettleOutcome::OrderMissing,
            },
        };
        tx.commit().await?;
        Ok(result)
    }
}

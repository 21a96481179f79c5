use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        errors::OrderFlowError,
        order_objects::{NewOrderRequest, OrderView},
    },
    db_types::{NewOrder, OrderId, OrderStatus, Role},
    policy,
    traits::{OrderStore, ProductCatalog},
};

/// `OrderFlowApi` drives the placement and administration of orders: catalog lookup, stock
/// validation, snapshot pricing, persistence, and role-gated reads and status changes.
pub struct OrderFlowApi<B, C> {
    store: B,
    catalog: C,
}

impl<B, C> Debug for OrderFlowApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, C> OrderFlowApi<B, C> {
    pub fn new(store: B, catalog: C) -> Self {
        Self { store, catalog }
    }
}

impl<B, C> OrderFlowApi<B, C>
where
    B: OrderStore,
    C: ProductCatalog,
{
    /// Place a new order for `buyer_id`.
    ///
    /// The product is fetched from the remote catalog with the caller's own credential, stock is
    /// checked (no reservation is made; see the race note on the trait), and the order is
    /// persisted as a snapshot: `total_amount = unit price × quantity` in fixed point, with
    /// `Placed`/`Pending` statuses. A catalog or store failure leaves no partial order behind.
    pub async fn place_order(
        &self,
        buyer_id: i64,
        request: NewOrderRequest,
        bearer_token: &str,
    ) -> Result<OrderView, OrderFlowError> {
        if request.quantity <= 0 {
            return Err(OrderFlowError::ValidationError(format!(
                "Order quantity must be positive, got {}",
                request.quantity
            )));
        }
        let product = self.catalog.product_by_id(request.product_id, bearer_token).await?;
        if product.stock_quantity < request.quantity {
            debug!(
                "🛒️ Rejecting order for product {}: {} in stock, {} requested",
                product.product_id, product.stock_quantity, request.quantity
            );
            return Err(OrderFlowError::InsufficientStock {
                product_id: product.product_id,
                requested: request.quantity,
                available: product.stock_quantity,
            });
        }
        let total_amount = product.unit_price.checked_mul(request.quantity).ok_or_else(|| {
            OrderFlowError::ValidationError(format!(
                "Order total for {} x {} overflows the money range",
                product.unit_price, request.quantity
            ))
        })?;
        let order = NewOrder::new(
            buyer_id,
            product.seller_id,
            product.product_id,
            product.name,
            request.quantity,
            total_amount,
        );
        let order = self.store.insert_order(order).await?;
        info!("🛒️ Order {} placed by buyer {buyer_id} for {} ({})", order.id, order.product_name, order.total_amount);
        Ok(order.into())
    }

    /// Fetch a single order, applying the visibility policy. A missing order is `NotFound`; a
    /// policy denial is `AccessDenied`. The two are deliberately distinct.
    pub async fn order_by_id(&self, id: &OrderId, actor_id: i64, role: Role) -> Result<OrderView, OrderFlowError> {
        let order =
            self.store.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(*id))?;
        if !policy::can_view(actor_id, role, &order) {
            debug!("🛒️ {role} {actor_id} denied access to order {id}");
            return Err(OrderFlowError::AccessDenied("You may only view your own orders".to_string()));
        }
        Ok(order.into())
    }

    /// All orders for a buyer, in insertion order.
    pub async fn orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<OrderView>, OrderFlowError> {
        let orders = self.store.fetch_orders_for_buyer(buyer_id).await?;
        Ok(orders.into_iter().map(OrderView::from).collect())
    }

    /// Administrative status change. The status name is matched case-insensitively against the
    /// known statuses, and the transition must be legal per [`check_transition`].
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        new_status_name: &str,
        role: Role,
    ) -> Result<OrderView, OrderFlowError> {
        if !policy::can_mutate_status(role) {
            return Err(OrderFlowError::AccessDenied("Only admins may change an order's status".to_string()));
        }
        let name = new_status_name.trim();
        if name.is_empty() {
            return Err(OrderFlowError::ValidationError("Order status cannot be empty".to_string()));
        }
        let new_status: OrderStatus =
            name.parse().map_err(|_| OrderFlowError::ValidationError(format!("Unknown order status: {name}")))?;
        let order =
            self.store.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(*id))?;
        check_transition(order.order_status, new_status)?;
        let updated = self.store.update_order_status(id, new_status).await?;
        info!("🛒️ Order {id} moved from {} to {}", order.order_status, updated.order_status);
        Ok(updated.into())
    }
}

/// The legal fulfilment transitions:
///
/// | From \ To | Placed | Shipped | Delivered | Cancelled |
/// |-----------|--------|---------|-----------|-----------|
/// | Placed    | NoOp   | Ok      | Err       | Ok        |
/// | Shipped   | Err    | NoOp    | Ok        | Ok        |
/// | Delivered | Err    | Err     | NoOp      | Err       |
/// | Cancelled | Err    | Err     | Err       | NoOp      |
///
/// `Delivered` and `Cancelled` are terminal, and an order cannot move backwards. Requesting the
/// current status again is reported as a no-op rather than silently succeeding.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderFlowError> {
    use OrderStatus::*;
    match (from, to) {
        (old, new) if old == new => Err(OrderFlowError::OrderModificationNoOp),
        (Placed, Shipped | Cancelled) => Ok(()),
        (Shipped, Delivered | Cancelled) => Ok(()),
        (from, to) => Err(OrderFlowError::OrderModificationForbidden { from, to }),
    }
}

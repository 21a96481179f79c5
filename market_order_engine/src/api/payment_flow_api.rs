use std::fmt::Debug;

use log::*;

use crate::{
    api::{errors::OrderFlowError, order_objects::PaymentInit},
    db_types::OrderId,
    policy,
    traits::{CheckoutProvider, OrderStore},
};

/// `PaymentFlowApi` turns an existing order into a hosted checkout session at the payment
/// provider. Only the order's own buyer may start a checkout.
pub struct PaymentFlowApi<B, P> {
    store: B,
    provider: P,
}

impl<B, P> Debug for PaymentFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, P> PaymentFlowApi<B, P> {
    pub fn new(store: B, provider: P) -> Self {
        Self { store, provider }
    }
}

impl<B, P> PaymentFlowApi<B, P>
where
    B: OrderStore,
    P: CheckoutProvider,
{
    /// Create a checkout session for the order and return the provider's redirect url.
    ///
    /// The per-unit price is recovered from the stored total (`total ÷ quantity`, rounded
    /// half-up at minor-unit precision) and quoted to the provider in minor units. A provider
    /// failure propagates as `PaymentProviderError` and leaves the order untouched; on success
    /// the session id is recorded in the ledger and `payment_status` is re-asserted as
    /// `Pending`.
    ///
    /// Calling this repeatedly for the same order is allowed and creates a fresh provider
    /// session each time; every session lands in the ledger and any of them can settle the
    /// order.
    pub async fn initiate_payment(&self, id: &OrderId, actor_id: i64) -> Result<PaymentInit, OrderFlowError> {
        let order =
            self.store.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound(*id))?;
        if !policy::can_pay(actor_id, &order) {
            debug!("💳️ Actor {actor_id} denied payment initiation for order {id}");
            return Err(OrderFlowError::AccessDenied("Only the order's buyer may pay for it".to_string()));
        }
        let unit_price = order
            .total_amount
            .div_round_half_up(order.quantity)
            .map_err(|e| OrderFlowError::ValidationError(e.to_string()))?;
        let checkout = self
            .provider
            .create_session(&order.id, &order.product_name, unit_price.value(), order.quantity)
            .await?;
        let order = self.store.record_checkout_session(&order.id, &checkout.session_id).await?;
        info!("💳️ Checkout session {} created for order {id}", checkout.session_id);
        Ok(PaymentInit { payment_url: checkout.redirect_url, payment_status: order.payment_status })
    }
}

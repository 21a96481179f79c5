use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::OrderFlowError,
    db_types::{OrderId, PaymentStatus},
    traits::{OrderStore, SettleOutcome},
};

/// The engine's view of a provider webhook delivery, produced by the transport layer *after*
/// signature verification. Deliveries are at-least-once: the same event can arrive any number of
/// times, concurrently.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    /// The buyer completed checkout and the provider captured payment.
    CheckoutCompleted { event_id: String, session_id: String, order_ref: Option<String> },
    /// The checkout definitively failed (asynchronous payment failure or session expiry).
    CheckoutFailed { event_id: String, session_id: String, order_ref: Option<String> },
    /// Any event type without a reconciliation side effect.
    Other { event_id: String, event_type: String },
}

/// Acknowledgment returned to the provider. Anything after a valid signature acks as received,
/// including events we could not match to an order; failing those would only trigger pointless
/// redelivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    pub message: String,
}

impl WebhookAck {
    fn new<S: Into<String>>(message: S) -> Self {
        Self { received: true, message: message.into() }
    }
}

/// `WebhookReconciler` applies provider-pushed payment outcomes to the order store,
/// idempotently. The only error it surfaces is a store failure — that is worth a non-2xx so the
/// provider redelivers once the store is healthy again.
pub struct WebhookReconciler<B> {
    store: B,
}

impl<B> Debug for WebhookReconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookReconciler")
    }
}

impl<B> WebhookReconciler<B> {
    pub fn new(store: B) -> Self {
        Self { store }
    }
}

impl<B> WebhookReconciler<B>
where B: OrderStore
{
    pub async fn handle_event(&self, event: PaymentEvent) -> Result<WebhookAck, OrderFlowError> {
        match event {
            PaymentEvent::CheckoutCompleted { event_id, session_id, order_ref } => {
                self.settle(&event_id, &session_id, order_ref.as_deref(), PaymentStatus::Paid).await
            },
            PaymentEvent::CheckoutFailed { event_id, session_id, order_ref } => {
                self.settle(&event_id, &session_id, order_ref.as_deref(), PaymentStatus::Failed).await
            },
            PaymentEvent::Other { event_id, event_type } => {
                trace!("🔔️ Ignoring webhook event {event_id} of type {event_type}");
                Ok(WebhookAck::new("Event acknowledged"))
            },
        }
    }

    async fn settle(
        &self,
        event_id: &str,
        session_id: &str,
        order_ref: Option<&str>,
        outcome: PaymentStatus,
    ) -> Result<WebhookAck, OrderFlowError> {
        let Some(order_id) = order_ref.and_then(|r| r.parse::<OrderId>().ok()) else {
            warn!("🔔️ Event {event_id} for session {session_id} carries no usable order reference. Acknowledging.");
            return Ok(WebhookAck::new("Event acknowledged"));
        };
        match self.store.settle_payment(&order_id, session_id, outcome).await? {
            SettleOutcome::Applied(order) => {
                info!("🔔️ Order {order_id} payment status set to {} by event {event_id}", order.payment_status);
                Ok(WebhookAck::new("Payment status updated"))
            },
            SettleOutcome::AlreadySettled(order) => {
                debug!(
                    "🔔️ Event {event_id} redelivered for order {order_id}; payment status stays {}",
                    order.payment_status
                );
                Ok(WebhookAck::new("Payment status already settled"))
            },
            SettleOutcome::SessionUnknown => {
                warn!(
                    "🔔️ Event {event_id} references session {session_id} which was never recorded for order \
                     {order_id}. Acknowledging without changes."
                );
                Ok(WebhookAck::new("Event acknowledged"))
            },
            SettleOutcome::OrderMissing => {
                warn!("🔔️ Event {event_id} references unknown order {order_id}. Acknowledging without changes.");
                Ok(WebhookAck::new("Event acknowledged"))
            },
        }
    }
}

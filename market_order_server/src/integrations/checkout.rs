use checkout_client::{
    data_objects::{CHECKOUT_SESSION_COMPLETED, CHECKOUT_SESSION_EXPIRED, CHECKOUT_SESSION_PAYMENT_FAILED},
    CheckoutApi,
    WebhookEvent,
};
use market_order_engine::{
    db_types::OrderId,
    traits::{CheckoutProvider, CheckoutProviderError, HostedCheckout},
    PaymentEvent,
};

/// Adapts [`CheckoutApi`] to the engine's [`CheckoutProvider`] seam.
#[derive(Clone)]
pub struct CheckoutIntegration {
    api: CheckoutApi,
}

impl CheckoutIntegration {
    pub fn new(api: CheckoutApi) -> Self {
        Self { api }
    }
}

impl CheckoutProvider for CheckoutIntegration {
    async fn create_session(
        &self,
        reference: &OrderId,
        product_name: &str,
        unit_amount_minor: i64,
        quantity: i64,
    ) -> Result<HostedCheckout, CheckoutProviderError> {
        let session = self
            .api
            .create_session(&reference.value().to_string(), product_name, unit_amount_minor, quantity)
            .await
            .map_err(|e| CheckoutProviderError::SessionCreation(e.to_string()))?;
        let redirect_url =
            session.url.ok_or_else(|| CheckoutProviderError::SessionCreation("No redirect url returned".to_string()))?;
        Ok(HostedCheckout { session_id: session.id, redirect_url })
    }
}

/// Maps a verified provider webhook delivery onto the engine's event type. Failure and expiry
/// both reconcile as a failed checkout; everything unrecognized passes through as `Other` and is
/// acknowledged without action.
pub fn payment_event_from_webhook(event: WebhookEvent) -> PaymentEvent {
    let session = event.data.object;
    match event.event_type.as_str() {
        CHECKOUT_SESSION_COMPLETED => PaymentEvent::CheckoutCompleted {
            event_id: event.id,
            session_id: session.id,
            order_ref: session.client_reference_id,
        },
        CHECKOUT_SESSION_PAYMENT_FAILED | CHECKOUT_SESSION_EXPIRED => PaymentEvent::CheckoutFailed {
            event_id: event.id,
            session_id: session.id,
            order_ref: session.client_reference_id,
        },
        _ => PaymentEvent::Other { event_id: event.id, event_type: event.event_type },
    }
}

use thiserror::Error;

use crate::db_types::OrderId;

/// A hosted checkout session created at the payment provider. The buyer completes payment at
/// `redirect_url`; the provider reports the outcome later via webhook.
#[derive(Debug, Clone)]
pub struct HostedCheckout {
    pub session_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutProviderError {
    #[error("The provider refused to create a checkout session. {0}")]
    SessionCreation(String),
}

/// Session creation at the payment provider. Each call creates a brand-new session; the provider
/// enforces no idempotency at this layer.
#[allow(async_fn_in_trait)]
pub trait CheckoutProvider {
    /// Create a session for a single line item. `reference` is the order id, carried as the
    /// session's client reference so webhook events can be correlated back.
    async fn create_session(
        &self,
        reference: &OrderId,
        product_name: &str,
        unit_amount_minor: i64,
        quantity: i64,
    ) -> Result<HostedCheckout, CheckoutProviderError>;
}

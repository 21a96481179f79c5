use serde::{Deserialize, Serialize};

/// Event type that confirms a checkout was paid. The only event with a reconciliation side
/// effect besides the failure variants below.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
/// The buyer's asynchronous payment method ultimately failed.
pub const CHECKOUT_SESSION_PAYMENT_FAILED: &str = "checkout.session.async_payment_failed";
/// The session expired before the buyer completed it.
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";

/// A single line item on a hosted checkout session. Amounts are in the provider's minor-unit
/// integer representation (cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub unit_amount: i64,
    pub currency: String,
    pub quantity: i64,
}

/// Request body for creating a hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
    pub mode: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Caller-supplied correlation context, echoed back on webhook events. The order id rides
    /// here.
    pub client_reference_id: String,
    pub line_items: Vec<SessionLineItem>,
}

/// The provider's representation of a created (or completed) checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Redirect url for the buyer. Present on creation; absent on webhook echoes.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
}

/// A signed webhook delivery. Deliveries are at-least-once; consumers must treat redeliveries of
/// the same event as no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: CheckoutSession,
}

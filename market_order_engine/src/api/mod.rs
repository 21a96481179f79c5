//! Public API of the order engine.
//!
//! Three orchestrators, one per flow:
//! * [`OrderFlowApi`] — placement, retrieval, listing and administrative status changes.
//! * [`PaymentFlowApi`] — hosted-checkout initiation for an existing order.
//! * [`WebhookReconciler`] — applies provider webhook events to payment state.

pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_flow_api;
pub mod reconciler_api;

pub use errors::OrderFlowError;
pub use order_flow_api::OrderFlowApi;
pub use order_objects::{NewOrderRequest, OrderView, PaymentInit};
pub use payment_flow_api::PaymentFlowApi;
pub use reconciler_api::{PaymentEvent, WebhookAck, WebhookReconciler};

//! Market Order Engine
//!
//! The order orchestration and payment reconciliation core of the marketplace. The engine owns
//! the order data model and its two-axis state machine (fulfilment status × payment status) and
//! exposes three orchestrators:
//!
//! 1. [`OrderFlowApi`] places orders against a point-in-time product snapshot fetched from the
//!    remote catalog, and serves role-gated reads and administrative status changes.
//! 2. [`PaymentFlowApi`] creates hosted checkout sessions at the payment provider for an order's
//!    buyer.
//! 3. [`WebhookReconciler`] applies the provider's asynchronous, at-least-once webhook events to
//!    payment state, idempotently.
//!
//! Storage and the two remote services sit behind the traits in [`mod@traits`]; the shipped
//! backend is [`SqliteOrderStore`]. Authorization is the set of pure predicates in
//! [`mod@policy`], invoked with explicit actor parameters at the start of every operation.

pub mod api;
pub mod db_types;
pub mod policy;
pub mod sqlite;
pub mod traits;

pub use api::{
    errors::OrderFlowError,
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_flow_api::PaymentFlowApi,
    reconciler_api::{PaymentEvent, WebhookAck, WebhookReconciler},
};
pub use sqlite::SqliteOrderStore;

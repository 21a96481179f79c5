//! Client for the hosted-checkout payment provider.
//!
//! Two halves, matching the two directions of traffic:
//! * [`CheckoutApi`] creates hosted checkout sessions (outbound, synchronous). The buyer is
//!   redirected to the returned url; the provider collects payment out of band.
//! * [`data_objects`] and [`signature`] describe the provider's signed webhook events (inbound,
//!   asynchronous, at-least-once). Signature verification runs over the *raw* request body and
//!   must happen before the payload is parsed.

mod api;
mod config;
pub mod data_objects;
mod error;
pub mod signature;

pub use api::CheckoutApi;
pub use config::CheckoutConfig;
pub use data_objects::{CheckoutSession, NewSessionRequest, SessionLineItem, WebhookEvent};
pub use error::CheckoutApiError;

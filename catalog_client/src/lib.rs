//! Client for the product catalog service.
//!
//! The catalog is an external collaborator: orders are validated and priced against it, but it is
//! owned and operated elsewhere. This crate exposes the single read endpoint the order flow needs
//! (`product_by_id`), wrapped in an explicit timeout, a bounded retry policy and a
//! consecutive-failure circuit breaker so that a slow or dead catalog cannot stall order
//! placement indefinitely.

mod api;
mod config;
mod data_objects;
mod error;

pub use api::CatalogApi;
pub use config::CatalogConfig;
pub use data_objects::ProductSnapshot;
pub use error::CatalogApiError;

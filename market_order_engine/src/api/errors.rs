use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderStatus},
    traits::{CheckoutProviderError, OrderStoreError, ProductCatalogError},
};

/// Error taxonomy shared by all three orchestrators. Each variant maps to a distinct failure
/// class at the transport layer; in particular `AccessDenied` and the not-found variants are
/// never conflated.
#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Invalid request. {0}")]
    ValidationError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Access denied. {0}")]
    AccessDenied(String),
    #[error("Insufficient stock for product {product_id}: {requested} requested, {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("The product catalog is unavailable. {0}")]
    CatalogUnavailable(String),
    #[error("Payment session creation failed. {0}")]
    PaymentProviderError(String),
    #[error("The requested status change would be a no-op")]
    OrderModificationNoOp,
    #[error("Orders cannot move from {from} to {to}")]
    OrderModificationForbidden { from: OrderStatus, to: OrderStatus },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderStoreError::DatabaseError(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ProductCatalogError> for OrderFlowError {
    fn from(e: ProductCatalogError) -> Self {
        match e {
            ProductCatalogError::NotFound(id) => Self::ProductNotFound(id),
            ProductCatalogError::Unavailable(msg) => Self::CatalogUnavailable(msg),
        }
    }
}

impl From<CheckoutProviderError> for OrderFlowError {
    fn from(e: CheckoutProviderError) -> Self {
        match e {
            CheckoutProviderError::SessionCreation(msg) => Self::PaymentProviderError(msg),
        }
    }
}

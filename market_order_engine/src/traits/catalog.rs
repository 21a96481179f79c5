use mkt_common::Money;
use thiserror::Error;

/// The engine's view of a catalog product: exactly the fields the placement flow snapshots into
/// an order. Transport-level extras (seller name, category) stay in the client crate.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub stock_quantity: i64,
    pub seller_id: i64,
}

#[derive(Debug, Clone, Error)]
pub enum ProductCatalogError {
    #[error("Product {0} does not exist")]
    NotFound(i64),
    #[error("The catalog service could not be reached. {0}")]
    Unavailable(String),
}

/// Read-only access to the remote product catalog. The call is synchronous from the engine's
/// point of view; timeouts and retries are the implementation's concern.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    /// Fetch the current snapshot of a product, authenticating with the caller's own bearer
    /// credential.
    async fn product_by_id(&self, product_id: i64, bearer_token: &str) -> Result<CatalogProduct, ProductCatalogError>;
}

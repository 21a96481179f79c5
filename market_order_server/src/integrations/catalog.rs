use catalog_client::{CatalogApi, CatalogApiError};
use market_order_engine::traits::{CatalogProduct, ProductCatalog, ProductCatalogError};

/// Adapts [`CatalogApi`] to the engine's [`ProductCatalog`] seam, narrowing the client's wire
/// type down to the snapshot fields the engine persists.
#[derive(Clone)]
pub struct CatalogIntegration {
    api: CatalogApi,
}

impl CatalogIntegration {
    pub fn new(api: CatalogApi) -> Self {
        Self { api }
    }
}

impl ProductCatalog for CatalogIntegration {
    async fn product_by_id(&self, product_id: i64, bearer_token: &str) -> Result<CatalogProduct, ProductCatalogError> {
        let product = self.api.product_by_id(product_id, bearer_token).await.map_err(|e| match e {
            CatalogApiError::ProductNotFound(id) => ProductCatalogError::NotFound(id),
            e => ProductCatalogError::Unavailable(e.to_string()),
        })?;
        Ok(CatalogProduct {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            stock_quantity: product.stock_quantity,
            seller_id: product.seller_id,
        })
    }
}

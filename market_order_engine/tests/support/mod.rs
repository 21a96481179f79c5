//! Shared setup for the engine integration tests: a throwaway SQLite database per test, plus
//! deterministic in-memory stand-ins for the two remote services.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
        Mutex,
    },
};

use market_order_engine::{
    db_types::OrderId,
    traits::{
        CatalogProduct,
        CheckoutProvider,
        CheckoutProviderError,
        HostedCheckout,
        ProductCatalog,
        ProductCatalogError,
    },
    SqliteOrderStore,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn prepare_store() -> SqliteOrderStore {
    let _ = env_logger::try_init();
    dotenvy::from_filename(".env.test").ok();
    let url = random_db_url();
    Sqlite::create_database(&url).await.expect("Error creating test database");
    let store = SqliteOrderStore::new_with_url(&url, 5).await.expect("Error connecting to test database");
    store.migrate().await.expect("Error running migrations");
    store
}

fn random_db_url() -> String {
    let path = std::env::temp_dir().join(format!("market_orders_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

//--------------------------------------   TestCatalog   -------------------------------------------------------------
/// Catalog fake: a fixed set of products, with a kill switch to simulate an outage.
#[derive(Clone, Default)]
pub struct TestCatalog {
    products: Arc<Mutex<HashMap<i64, CatalogProduct>>>,
    down: Arc<AtomicBool>,
}

impl TestCatalog {
    pub fn with_product(product: CatalogProduct) -> Self {
        let catalog = Self::default();
        catalog.products.lock().unwrap().insert(product.product_id, product);
        catalog
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

impl ProductCatalog for TestCatalog {
    async fn product_by_id(&self, product_id: i64, _bearer_token: &str) -> Result<CatalogProduct, ProductCatalogError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(ProductCatalogError::Unavailable("catalog outage (simulated)".to_string()));
        }
        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .ok_or(ProductCatalogError::NotFound(product_id))
    }
}

//--------------------------------------  TestProvider   -------------------------------------------------------------
/// Checkout provider fake: hands out sequentially numbered sessions, with a kill switch.
#[derive(Clone, Default)]
pub struct TestProvider {
    counter: Arc<AtomicU64>,
    fail: Arc<AtomicBool>,
}

impl TestProvider {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl CheckoutProvider for TestProvider {
    async fn create_session(
        &self,
        reference: &OrderId,
        _product_name: &str,
        _unit_amount_minor: i64,
        _quantity: i64,
    ) -> Result<HostedCheckout, CheckoutProviderError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CheckoutProviderError::SessionCreation("provider returned 500 (simulated)".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("cs_test_{n}");
        Ok(HostedCheckout {
            redirect_url: format!("https://checkout.example.com/pay/{session_id}?ref={}", reference.value()),
            session_id,
        })
    }
}

/// The worked example from the product docs: 19.99, five in stock, sold by seller 7.
pub fn keyboard_product() -> CatalogProduct {
    CatalogProduct {
        product_id: 1,
        name: "Mechanical keyboard".to_string(),
        unit_price: "19.99".parse().unwrap(),
        stock_quantity: 5,
        seller_id: 7,
    }
}

use chrono::{TimeZone, Utc};
use market_order_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentStatus},
    traits::{
        CatalogProduct,
        CheckoutProvider,
        CheckoutProviderError,
        HostedCheckout,
        OrderStore,
        OrderStoreError,
        ProductCatalog,
        ProductCatalogError,
        SettleOutcome,
    },
};
use mkt_common::Money;
use mockall::mock;

mock! {
    pub Store {}
    impl OrderStore for Store {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, OrderStoreError>;
        async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, OrderStoreError>;
        async fn record_checkout_session(&self, id: &OrderId, session_id: &str) -> Result<Order, OrderStoreError>;
        async fn settle_payment(
            &self,
            id: &OrderId,
            session_id: &str,
            outcome: PaymentStatus,
        ) -> Result<SettleOutcome, OrderStoreError>;
    }
}

mock! {
    pub Catalog {}
    impl ProductCatalog for Catalog {
        async fn product_by_id(&self, product_id: i64, bearer_token: &str) -> Result<CatalogProduct, ProductCatalogError>;
    }
}

mock! {
    pub Provider {}
    impl CheckoutProvider for Provider {
        async fn create_session(
            &self,
            reference: &OrderId,
            product_name: &str,
            unit_amount_minor: i64,
            quantity: i64,
        ) -> Result<HostedCheckout, CheckoutProviderError>;
    }
}

/// A 2 × 19.99 order for buyer 42 from seller 7.
pub fn sample_order(id: i64) -> Order {
    Order {
        id: OrderId(id),
        buyer_id: 42,
        seller_id: 7,
        product_id: 1,
        product_name: "Mechanical keyboard".to_string(),
        quantity: 2,
        total_amount: Money::from_minor(3998),
        order_status: OrderStatus::Placed,
        payment_status: PaymentStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

pub fn keyboard_product() -> CatalogProduct {
    CatalogProduct {
        product_id: 1,
        name: "Mechanical keyboard".to_string(),
        unit_price: Money::from_minor(1999),
        stock_quantity: 5,
        seller_id: 7,
    }
}

use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use catalog_client::CatalogApi;
use checkout_client::CheckoutApi;
use log::info;
use market_order_engine::{OrderFlowApi, PaymentFlowApi, SqliteOrderStore, WebhookReconciler};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{CatalogIntegration, CheckoutIntegration},
    middleware::SignatureMiddlewareFactory,
    routes::{
        health,
        CheckoutWebhookRoute,
        InitiatePaymentRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PlaceOrderRoute,
        UpdateOrderStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = SqliteOrderStore::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    store.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let catalog = CatalogApi::new(config.catalog.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let checkout =
        CheckoutApi::new(config.checkout.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, store, catalog, checkout)?;
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance(
    config: ServerConfig,
    store: SqliteOrderStore,
    catalog: CatalogApi,
    checkout: CheckoutApi,
) -> Result<Server, ServerError> {
    info!("🚀️ Order server configured for {}:{}", config.host, config.port);
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(store.clone(), CatalogIntegration::new(catalog.clone()));
        let payments_api = PaymentFlowApi::new(store.clone(), CheckoutIntegration::new(checkout.clone()));
        let reconciler = WebhookReconciler::new(store.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("market::access_log"))
            .app_data(web::Data::new(config.auth.clone()))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(reconciler));
        // Order matters: the static /my-orders path must be registered ahead of /{id}
        let orders_scope = web::scope("/api/orders")
            .service(PlaceOrderRoute::<SqliteOrderStore, CatalogIntegration>::new())
            .service(MyOrdersRoute::<SqliteOrderStore, CatalogIntegration>::new())
            .service(OrderByIdRoute::<SqliteOrderStore, CatalogIntegration>::new())
            .service(UpdateOrderStatusRoute::<SqliteOrderStore, CatalogIntegration>::new())
            .service(InitiatePaymentRoute::<SqliteOrderStore, CheckoutIntegration>::new());
        let webhook_scope = web::scope("/webhook")
            .wrap(SignatureMiddlewareFactory::new(
                config.checkout.webhook_secret.clone(),
                config.signature_checks,
            ))
            .service(CheckoutWebhookRoute::<SqliteOrderStore>::new());
        app.service(health).service(orders_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

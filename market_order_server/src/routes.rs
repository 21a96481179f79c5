//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go
//! into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the engine's trait seams so the endpoint tests can run them against
//! mocks, and actix-web cannot register generic handlers directly, so each one is wrapped in a
//! small `HttpServiceFactory` struct via the `route!` macro.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use market_order_engine::{
    db_types::OrderId,
    order_objects::NewOrderRequest,
    policy,
    traits::{CheckoutProvider, OrderStore, ProductCatalog},
    OrderFlowApi,
    OrderFlowError,
    PaymentFlowApi,
    WebhookReconciler,
};

use crate::{
    auth::JwtClaims,
    data_objects::{JsonResponse, StatusUpdateRequest},
    errors::ServerError,
    helpers::bearer_token,
    integrations::payment_event_from_webhook,
};

#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "" impl OrderStore, ProductCatalog);
/// Place a new order. Buyer-only; the buyer's identity comes from the access token, and the same
/// bearer credential is forwarded to the catalog service for the product lookup.
pub async fn place_order<B, C>(
    req: HttpRequest,
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + 'static,
    C: ProductCatalog + 'static,
{
    trace!("💻️ POST order for buyer {}", claims.sub);
    if !policy::can_place_order(claims.role) {
        return Err(ServerError::InsufficientPermissions("Only buyers may place orders".to_string()));
    }
    let token = bearer_token(&req)?;
    let order = api.place_order(claims.sub, body.into_inner(), &token).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(my_orders => Get "/my-orders" impl OrderStore, ProductCatalog);
/// All orders belonging to the calling buyer.
pub async fn my_orders<B, C>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + 'static,
    C: ProductCatalog + 'static,
{
    trace!("💻️ GET orders for buyer {}", claims.sub);
    let orders = api.orders_for_buyer(claims.sub).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/{id}" impl OrderStore, ProductCatalog);
/// Fetch a single order. Visibility is decided by the policy, not the route: admins see
/// everything, buyers and sellers only their own orders.
pub async fn order_by_id<B, C>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + 'static,
    C: ProductCatalog + 'static,
{
    let id = OrderId(path.into_inner());
    trace!("💻️ GET order {id} for {} {}", claims.role, claims.sub);
    let order = api.order_by_id(&id, claims.sub, claims.role).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Put "/{id}/status" impl OrderStore, ProductCatalog);
/// Administrative status change. The engine enforces both the admin gate and the legal
/// transition table.
pub async fn update_order_status<B, C>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + 'static,
    C: ProductCatalog + 'static,
{
    let id = OrderId(path.into_inner());
    debug!("💻️ PUT order {id} status to '{}' by {} {}", body.order_status, claims.role, claims.sub);
    let order = api.update_order_status(&id, &body.order_status, claims.role).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------  Payments ----------------------------------------------------
route!(initiate_payment => Post "/{id}/pay" impl OrderStore, CheckoutProvider);
/// Start a hosted checkout for an order. The engine denies anyone but the order's own buyer,
/// admins included.
pub async fn initiate_payment<B, P>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + 'static,
    P: CheckoutProvider + 'static,
{
    let id = OrderId(path.into_inner());
    debug!("💻️ POST payment initiation for order {id} by actor {}", claims.sub);
    let init = api.initiate_payment(&id, claims.sub).await?;
    Ok(HttpResponse::Ok().json(init))
}

//----------------------------------------------  Webhook  ----------------------------------------------------
route!(checkout_webhook => Post "/checkout" impl OrderStore);
/// Inbound payment-provider events. The signature middleware has already verified the raw body
/// by the time this handler runs. Everything that parses is acknowledged with a 200 — matching
/// the provider's redelivery contract — except a store failure, which is worth a 500 so the
/// provider redelivers later.
pub async fn checkout_webhook<B>(
    body: web::Bytes,
    api: web::Data<WebhookReconciler<B>>,
) -> Result<HttpResponse, ServerError>
where B: OrderStore + 'static
{
    trace!("💻️ Received checkout webhook ({} bytes)", body.len());
    let event = match serde_json::from_slice::<checkout_client::WebhookEvent>(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("💻️ Could not parse webhook payload. {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Could not parse event payload")));
        },
    };
    match api.handle_event(payment_event_from_webhook(event)).await {
        Ok(ack) => Ok(HttpResponse::Ok().json(ack)),
        Err(e @ OrderFlowError::DatabaseError(_)) => Err(e.into()),
        Err(e) => {
            warn!("💻️ Unexpected error while reconciling webhook event. {e}");
            Ok(HttpResponse::Ok().json(JsonResponse::failure("Event could not be processed")))
        },
    }
}

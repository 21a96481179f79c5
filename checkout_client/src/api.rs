use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};

use crate::{
    data_objects::{CheckoutSession, NewSessionRequest, SessionLineItem},
    CheckoutApiError,
    CheckoutConfig,
};

#[derive(Clone)]
pub struct CheckoutApi {
    config: CheckoutConfig,
    client: Arc<Client>,
}

impl CheckoutApi {
    pub fn new(config: CheckoutConfig) -> Result<Self, CheckoutApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| CheckoutApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CheckoutApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn webhook_secret(&self) -> &str {
        self.config.webhook_secret.reveal()
    }

    /// Creates a hosted checkout session for a single line item, carrying `client_reference_id`
    /// so webhook events can be correlated back to the originating order. Every call creates a
    /// fresh session on the provider side.
    pub async fn create_session(
        &self,
        reference_id: &str,
        product_name: &str,
        unit_amount_minor: i64,
        quantity: i64,
    ) -> Result<CheckoutSession, CheckoutApiError> {
        let body = NewSessionRequest {
            mode: "payment".to_string(),
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
            client_reference_id: reference_id.to_string(),
            line_items: vec![SessionLineItem {
                name: product_name.to_string(),
                unit_amount: unit_amount_minor,
                currency: self.config.currency.clone(),
                quantity,
            }],
        };
        let url = format!("{}/v1/checkout/sessions", self.config.api_url);
        trace!("💳️ POST {url} (reference {reference_id})");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutApiError::RequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutApiError::QueryError { status, message });
        }
        let session =
            response.json::<CheckoutSession>().await.map_err(|e| CheckoutApiError::JsonError(e.to_string()))?;
        debug!("💳️ Created checkout session {} for reference {reference_id}", session.id);
        Ok(session)
    }
}

use std::env;

use log::*;
use mkt_common::Secret;

const DEFAULT_API_URL: &str = "https://api.checkout.example.com";
const DEFAULT_SUCCESS_URL: &str = "http://localhost:3000/success";
const DEFAULT_CANCEL_URL: &str = "http://localhost:3000/cancel";

#[derive(Clone, Debug, Default)]
pub struct CheckoutConfig {
    /// Base url of the provider API.
    pub api_url: String,
    /// API key used as a bearer credential on session-creation calls.
    pub secret_key: Secret<String>,
    /// Shared secret the provider signs webhook deliveries with.
    pub webhook_secret: Secret<String>,
    /// Where the provider redirects the buyer after a completed checkout.
    pub success_url: String,
    /// Where the provider redirects the buyer after an abandoned checkout.
    pub cancel_url: String,
    /// ISO currency code for line items, e.g. "usd".
    pub currency: String,
}

impl CheckoutConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("MKT_CHECKOUT_API_URL").ok().unwrap_or_else(|| {
            info!("🪛️ MKT_CHECKOUT_API_URL is not set. Using the default, {DEFAULT_API_URL}.");
            DEFAULT_API_URL.to_string()
        });
        let secret_key = env::var("MKT_CHECKOUT_SECRET_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ MKT_CHECKOUT_SECRET_KEY is not set. Session creation calls will be rejected by the provider.");
            String::default()
        });
        let webhook_secret = env::var("MKT_CHECKOUT_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ MKT_CHECKOUT_WEBHOOK_SECRET is not set. Incoming webhooks cannot be verified.");
            String::default()
        });
        let success_url =
            env::var("MKT_CHECKOUT_SUCCESS_URL").ok().unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string());
        let cancel_url = env::var("MKT_CHECKOUT_CANCEL_URL").ok().unwrap_or_else(|| DEFAULT_CANCEL_URL.to_string());
        let currency = env::var("MKT_CHECKOUT_CURRENCY").ok().unwrap_or_else(|| "usd".to_string());
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: Secret::new(secret_key),
            webhook_secret: Secret::new(webhook_secret),
            success_url,
            cancel_url,
            currency,
        }
    }
}

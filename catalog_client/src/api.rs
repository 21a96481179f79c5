use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use log::*;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Client,
    StatusCode,
};

use crate::{CatalogApiError, CatalogConfig, ProductSnapshot};

/// State for the consecutive-failure circuit breaker. While the circuit is open, calls fail fast
/// with [`CatalogApiError::CircuitOpen`] instead of queueing up behind a dead catalog.
#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

#[derive(Clone)]
pub struct CatalogApi {
    config: CatalogConfig,
    client: Arc<Client>,
    breaker: Arc<Mutex<BreakerState>>,
}

impl CatalogApi {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), breaker: Arc::new(Mutex::new(BreakerState::default())) })
    }

    /// Fetches the current snapshot for `product_id`, forwarding the caller's bearer credential.
    ///
    /// A failed attempt is retried up to `max_retries` times with linear backoff, but only for
    /// transient failures; a 404 is returned immediately as `ProductNotFound`.
    pub async fn product_by_id(&self, product_id: i64, bearer_token: &str) -> Result<ProductSnapshot, CatalogApiError> {
        self.check_breaker()?;
        let mut attempt = 0;
        loop {
            match self.fetch_product(product_id, bearer_token).await {
                Ok(product) => {
                    self.record_success();
                    return Ok(product);
                },
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("🏷️️ Catalog call for product {product_id} failed (attempt {attempt}). Retrying. {e}");
                    tokio::time::sleep(backoff(attempt)).await;
                },
                Err(e) => {
                    if e.is_transient() {
                        self.record_failure();
                    }
                    return Err(e);
                },
            }
        }
    }

    async fn fetch_product(&self, product_id: i64, bearer_token: &str) -> Result<ProductSnapshot, CatalogApiError> {
        let url = format!("{}/api/products/{product_id}", self.config.base_url);
        trace!("🏷️️ GET {url}");
        let auth = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
            .map_err(|e| CatalogApiError::RequestError(e.to_string()))?;
        let response = self.client.get(&url).header(AUTHORIZATION, auth).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogApiError::Timeout(e.to_string())
            } else {
                CatalogApiError::RequestError(e.to_string())
            }
        })?;
        match response.status() {
            s if s.is_success() => {
                response.json::<ProductSnapshot>().await.map_err(|e| CatalogApiError::JsonError(e.to_string()))
            },
            StatusCode::NOT_FOUND => Err(CatalogApiError::ProductNotFound(product_id)),
            s => {
                let message = response.text().await.unwrap_or_default();
                Err(CatalogApiError::QueryError { status: s.as_u16(), message })
            },
        }
    }

    fn check_breaker(&self) -> Result<(), CatalogApiError> {
        let mut state = self.breaker.lock().expect("catalog breaker lock poisoned");
        if let Some(open_until) = state.open_until {
            if Instant::now() < open_until {
                return Err(CatalogApiError::CircuitOpen);
            }
            // Cooldown elapsed. Let one probe through; a failure re-opens the circuit.
            state.open_until = None;
        }
        Ok(())
    }

    fn record_success(&self) {
        let mut state = self.breaker.lock().expect("catalog breaker lock poisoned");
        state.consecutive_failures = 0;
        state.open_until = None;
    }

    fn record_failure(&self) {
        let mut state = self.breaker.lock().expect("catalog breaker lock poisoned");
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.config.breaker_threshold {
            warn!(
                "🏷️️ Catalog has failed {} consecutive calls. Opening the circuit for {}s.",
                state.consecutive_failures,
                self.config.breaker_cooldown.as_secs()
            );
            state.open_until = Some(Instant::now() + self.config.breaker_cooldown);
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(250 * u64::from(attempt))
}

#[cfg(test)]
mod test {
    use super::*;

    fn api_with_threshold(threshold: u32) -> CatalogApi {
        let config =
            CatalogConfig { breaker_threshold: threshold, ..CatalogConfig::new("http://127.0.0.1:1") };
        CatalogApi::new(config).unwrap()
    }

    #[test]
    fn breaker_opens_after_threshold_failures() {
        let api = api_with_threshold(3);
        api.record_failure();
        api.record_failure();
        assert!(api.check_breaker().is_ok());
        api.record_failure();
        assert!(matches!(api.check_breaker(), Err(CatalogApiError::CircuitOpen)));
    }

    #[test]
    fn success_resets_the_breaker() {
        let api = api_with_threshold(2);
        api.record_failure();
        api.record_success();
        api.record_failure();
        assert!(api.check_breaker().is_ok());
    }

    #[tokio::test]
    async fn unreachable_catalog_surfaces_a_transient_error() {
        // Nothing listens on port 1; the request must fail without panicking.
        let api = api_with_threshold(10);
        let err = api.product_by_id(1, "token").await.expect_err("expected a connection error");
        assert!(err.is_transient(), "unexpected error kind: {err}");
    }
}

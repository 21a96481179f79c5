use std::{env, time::Duration};

use log::*;

const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:8081";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BREAKER_THRESHOLD: u32 = 5;
const DEFAULT_BREAKER_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Base url of the catalog service, e.g. "http://catalog.internal:8081"
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Number of retries after the first failed attempt.
    pub max_retries: u32,
    /// Consecutive failures before the circuit opens.
    pub breaker_threshold: u32,
    /// How long the circuit stays open before a new attempt is allowed through.
    pub breaker_cooldown: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            breaker_threshold: DEFAULT_BREAKER_THRESHOLD,
            breaker_cooldown: DEFAULT_BREAKER_COOLDOWN,
        }
    }
}

impl CatalogConfig {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let base_url = env::var("MKT_CATALOG_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MKT_CATALOG_URL is not set. Using the default, {DEFAULT_CATALOG_URL}.");
            DEFAULT_CATALOG_URL.to_string()
        });
        let timeout = env_duration_secs("MKT_CATALOG_TIMEOUT", DEFAULT_TIMEOUT);
        let max_retries = env_u32("MKT_CATALOG_MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let breaker_threshold = env_u32("MKT_CATALOG_BREAKER_THRESHOLD", DEFAULT_BREAKER_THRESHOLD);
        let breaker_cooldown = env_duration_secs("MKT_CATALOG_BREAKER_COOLDOWN", DEFAULT_BREAKER_COOLDOWN);
        Self { base_url: base_url.trim_end_matches('/').to_string(), timeout, max_retries, breaker_threshold, breaker_cooldown }
    }
}

fn env_u32(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .map(|s| {
            s.parse::<u32>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
                default
            })
        })
        .unwrap_or(default)
}

fn env_duration_secs(var: &str, default: Duration) -> Duration {
    env::var(var)
        .ok()
        .map(|s| match s.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(e) => {
                error!(
                    "🪛️ {s} is not a valid number of seconds for {var}. {e} Using the default, {}s, instead.",
                    default.as_secs()
                );
                default
            },
        })
        .unwrap_or(default)
}

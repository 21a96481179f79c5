use std::env;

use catalog_client::CatalogConfig;
use checkout_client::CheckoutConfig;
use log::*;
use mkt_common::{parse_boolean_flag, Secret};

const DEFAULT_MKT_HOST: &str = "127.0.0.1";
const DEFAULT_MKT_PORT: u16 = 8083;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// When false, webhook signature checks are skipped. Local development only.
    pub signature_checks: bool,
    pub catalog: CatalogConfig,
    pub checkout: CheckoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MKT_HOST.to_string(),
            port: DEFAULT_MKT_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            signature_checks: true,
            catalog: CatalogConfig::default(),
            checkout: CheckoutConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MKT_HOST").ok().unwrap_or_else(|| DEFAULT_MKT_HOST.into());
        let port = env::var("MKT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MKT_PORT. {e} Using the default, {DEFAULT_MKT_PORT}, instead."
                    );
                    DEFAULT_MKT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MKT_PORT);
        let database_url = env::var("MKT_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MKT_DATABASE_URL is not set. Please set it to the URL for the order database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the auth configuration from the environment. {e}. Using the default.");
            AuthConfig::default()
        });
        let signature_checks = parse_boolean_flag(env::var("MKT_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!("🪛️ Webhook signature checks are DISABLED. Do not run this configuration in production.");
        }
        Self {
            host,
            port,
            database_url,
            auth,
            signature_checks,
            catalog: CatalogConfig::from_env_or_default(),
            checkout: CheckoutConfig::from_env_or_default(),
        }
    }
}

//--------------------------------------    AuthConfig      ----------------------------------------------------------
/// HS256 secret the identity service signs access tokens with. Token *issuance* belongs to the
/// identity service; this server only verifies.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, String> {
        let secret = env::var("MKT_JWT_SECRET").map_err(|_| "MKT_JWT_SECRET is not set".to_string())?;
        if secret.trim().is_empty() {
            return Err("MKT_JWT_SECRET is empty".to_string());
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//! Access-token handling.
//!
//! The identity service (out of scope here) issues short-lived HS256 JWTs whose claims carry the
//! actor's id (`sub`) and single [`Role`]. This module verifies those tokens and surfaces the
//! claims to handlers as an extractor, so every orchestrator call receives explicit identity
//! parameters. [`TokenIssuer`] exists for the test suites and local tooling; the server itself
//! never issues tokens.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    Token,
    UntrustedToken,
};
use market_order_engine::db_types::Role;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::{AuthError, ServerError}, helpers::bearer_token};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The actor's user id at the identity service.
    pub sub: i64,
    pub role: Role,
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| ServerError::InitializeError("AuthConfig is not registered on the app".to_string()))?;
    let token = bearer_token(req)?;
    Ok(validate_access_token(&token, config.jwt_secret.reveal())?)
}

/// Verifies the token's signature and expiry and returns its claims.
pub fn validate_access_token(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let key = Hs256Key::new(secret.as_bytes());
    let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e:?}")))?;
    let token: Token<JwtClaims> =
        Hs256.validator(&key).validate(&untrusted).map_err(|e| AuthError::ValidationError(format!("{e}")))?;
    token
        .claims()
        .validate_expiration(&TimeOptions::default())
        .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
    Ok(token.claims().custom.clone())
}

pub struct TokenIssuer {
    key: Hs256Key,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Issue a signed access token for the given claims. Defaults to a 24-hour lifetime.
    pub fn issue_token(&self, claims: JwtClaims, duration: Option<chrono::Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| chrono::Duration::hours(24));
        let claims = Claims::new(claims).set_duration_and_issuance(&TimeOptions::default(), duration);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::ValidationError(format!("{e}")))
    }
}

#[cfg(test)]
mod test {
    use mkt_common::Secret;

    use super::*;

    fn config() -> AuthConfig {
        AuthConfig { jwt_secret: Secret::new("test-jwt-secret".to_string()) }
    }

    #[test]
    fn issued_tokens_validate() {
        let issuer = TokenIssuer::new(&config());
        let claims = JwtClaims { sub: 42, role: Role::Buyer };
        let token = issuer.issue_token(claims.clone(), None).unwrap();
        let validated = validate_access_token(&token, "test-jwt-secret").unwrap();
        assert_eq!(validated, claims);
    }

    #[test]
    fn tokens_signed_with_another_secret_fail() {
        let issuer = TokenIssuer::new(&config());
        let token = issuer.issue_token(JwtClaims { sub: 42, role: Role::Buyer }, None).unwrap();
        let err = validate_access_token(&token, "a-different-secret").expect_err("expected failure");
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[test]
    fn expired_tokens_fail() {
        let issuer = TokenIssuer::new(&config());
        let token =
            issuer.issue_token(JwtClaims { sub: 42, role: Role::Buyer }, Some(chrono::Duration::hours(-1))).unwrap();
        let err = validate_access_token(&token, "test-jwt-secret").expect_err("expected failure");
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[test]
    fn garbage_tokens_are_poorly_formatted() {
        let err = validate_access_token("not-a-jwt", "test-jwt-secret").expect_err("expected failure");
        assert!(matches!(err, AuthError::PoorlyFormattedToken(_)));
    }
}

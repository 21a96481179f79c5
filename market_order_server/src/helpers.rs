use actix_web::{http::header::AUTHORIZATION, HttpRequest};

use crate::errors::AuthError;

/// Extracts the raw bearer credential from the `Authorization` header. The same credential is
/// forwarded verbatim to the catalog service on placement calls.
pub fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))
}

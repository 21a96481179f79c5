use actix_web::{
    http::StatusCode,
    test,
    web::{self, ServiceConfig},
    App,
};
use mkt_common::Secret;
use serde_json::Value;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
};

pub const TEST_JWT_SECRET: &str = "endpoint-test-secret";

pub fn auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()) }
}

pub fn issue_token(claims: JwtClaims) -> String {
    TokenIssuer::new(&auth_config()).issue_token(claims, None).expect("could not issue test token")
}

pub async fn get_request<F>(token: &str, path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig)
{
    send(test::TestRequest::get().uri(path), token, configure).await
}

pub async fn post_request<F>(token: &str, path: &str, body: Value, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig)
{
    send(test::TestRequest::post().uri(path).set_json(body), token, configure).await
}

pub async fn put_request<F>(token: &str, path: &str, body: Value, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig)
{
    send(test::TestRequest::put().uri(path).set_json(body), token, configure).await
}

async fn send<F>(mut req: test::TestRequest, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig)
{
    let app =
        test::init_service(App::new().app_data(web::Data::new(auth_config())).configure(configure)).await;
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    // Errors surfacing from extractors or middleware arrive as `Err`; fold them into a plain
    // (status, body) pair so tests can assert uniformly
    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).to_string())
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

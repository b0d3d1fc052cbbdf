#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};
use stanza::auth::{MemoryStorage, SessionCoordinator, TokenPair, TokenStore};
use stanza::client::ApiClient;
use stanza::config::ClientConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Unsigned JWT whose payload carries `exp`.
pub fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "user-1", "exp": exp }).to_string());
    format!("{header}.{payload}.signature")
}

/// Unsigned JWT expiring `secs` from now (negative for already expired).
pub fn jwt_expiring_in(secs: i64) -> String {
    jwt_with_exp(Utc::now().timestamp() + secs)
}

/// A pair whose access token will not be due for refresh during a test.
pub fn fresh_pair(tag: &str) -> TokenPair {
    TokenPair::new(jwt_expiring_in(3600), format!("refresh-{tag}"))
}

pub fn memory_store() -> TokenStore {
    TokenStore::new(Arc::new(MemoryStorage::new()))
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_api_base_url(server.uri())
        .with_frontend_url("https://stanza.test")
}

pub fn client_for(server: &MockServer, store: TokenStore) -> ApiClient {
    ApiClient::new(config_for(server), store).expect("client")
}

pub fn session_for(server: &MockServer) -> SessionCoordinator {
    SessionCoordinator::new(client_for(server, memory_store()))
}

pub fn envelope(data: Value) -> Value {
    json!({ "data": data, "success": true })
}

pub fn user_json(id: &str, email: &str) -> Value {
    json!({ "id": id, "email": email, "name": "Reader", "fullName": "Ada Reader" })
}

pub async fn mount_me(server: &MockServer, user: Value) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user)))
        .mount(server)
        .await;
}

pub fn token_pair_json(pair: &TokenPair) -> Value {
    json!({ "accessToken": pair.access_token, "refreshToken": pair.refresh_token })
}

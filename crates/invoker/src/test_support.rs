// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for unit tests: mock servers, fake tokens, credential files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use jsonwebtoken::{EncodingKey, Header};
use tokio::net::TcpListener;

/// PKCS#8 RSA key used only by tests.
pub const TEST_RSA_KEY: &str = include_str!("credential/testdata/service_account_key.pem");

/// A reqwest client with the crypto provider installed.
pub fn http_client() -> reqwest::Client {
    crate::install_crypto_provider();
    reqwest::Client::builder().build().expect("build reqwest client")
}

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

/// An HS256 JWT carrying only `sub` and `exp`. Signature is irrelevant to the
/// proxy, which never verifies identity tokens.
pub fn fake_id_token(sub: &str, exp: u64) -> String {
    let claims = serde_json::json!({ "sub": sub, "exp": exp });
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test"))
        .expect("encode jwt")
}

/// Write a credentials JSON file into `dir`.
pub fn write_credentials(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).expect("write credentials file");
    path
}

/// `authorized_user` credentials refreshing against `token_uri`.
pub fn authorized_user_json(token_uri: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "authorized_user",
        "client_id": "test-client",
        "client_secret": "test-secret",
        "refresh_token": "test-refresh",
        "token_uri": token_uri,
    })
}

/// `service_account` key exchanging assertions at `token_uri`.
pub fn service_account_json(token_uri: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "service_account",
        "client_email": "invoker@test-project.iam.gserviceaccount.com",
        "private_key": TEST_RSA_KEY,
        "private_key_id": "key-1",
        "token_uri": token_uri,
    })
}

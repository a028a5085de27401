// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: signing keys, tokens, a local JWKS
//! endpoint and a throwaway application state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{body::Body, extract::State, http::StatusCode, routing::get, Json, Router};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;
use url::Url;

use crate::auth::{JwksManager, TokenVerifier, VerifierConfig};
use crate::state::AppState;
use crate::storage::DrinkStore;

pub const TEST_DOMAIN: &str = "coffee.test.auth0.com";
pub const TEST_ISSUER: &str = "https://coffee.test.auth0.com/";
pub const TEST_AUDIENCE: &str = "coffee";
pub const TEST_KID: &str = "coffee-test-key";
pub const ROTATED_KID: &str = "coffee-rotated-key";

/// Private key whose public half is published under [`TEST_KID`].
pub const IDP_KEY_PEM: &[u8] = include_bytes!("../testdata/idp_signing_key.pem");

/// Private key the identity provider has never published.
pub const ROGUE_KEY_PEM: &[u8] = include_bytes!("../testdata/rogue_signing_key.pem");

const IDP_MODULUS: &str = "ihacAnPJxgnvS-P83ykh3N-ZfTtO3yHbBTnB6Rxb7MsU60bxWCEeLLpDlQ0eQnC8CCq3Z7zcnjvnUBgBRqgH1q273lq5tKxiFLUDljDHFXKDNuEOcaFhZlI1dmK7-qpBQGDPk0PziLx6mH5X1fT92ozOmCRd6B5J-lCH5RMCWpmxgvzIlkjvitNT7Nf7MBn6mtiRSl-2PM62IUsc0Qt-FVemEIpud9W2SBxh0_bjATQZLli9g1STrB3VMtZqZOQSUGQaMbNxjj-C7Df7JTPw6_795knBj9sqH5XZLGCjGws-4FJNWjH1TWOmTjQiYxG29_fOVAUTKkQQuZ6AoQx6Ww";

const ROGUE_MODULUS: &str = "wpPRr-n-P0ULnZ-bGp0sGfiLRoKi3HY75hFAHlomLXdPa9Vf6slqSRtjCEwzgusFRpeJF4kTE7Y9q7pA4LhN8LpOiXEJ0xc7t4o-WUu3eM3FafxW-oswa1SFVFOvBWB9jiAKbBfbFAU3A_AZLdeJt3qJ0O2lVMnNBTclz_eLNZ3mJvTTAiYvdax1GV1NspMOSpYNXskEjS5wS1zdfPDz6HqwvH_C_Jt5gAFb1HX4vfNSowkA--IwNRxGCcQVL1nb0Qgn9cUHiit6iOGjcpFW8ENvcGj_zwDaONVGQXofj-WHjsbR3GyoiX7s6d4Qh3OWRx0GQyvHhugiuGSXhoTnzw";

fn rsa_jwk(kid: &str, modulus: &str) -> Value {
    json!({
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "kid": kid,
        "n": modulus,
        "e": "AQAB",
    })
}

/// The identity provider's published key set.
pub fn jwk_set() -> JwkSet {
    serde_json::from_value(json!({ "keys": [rsa_jwk(TEST_KID, IDP_MODULUS)] }))
        .expect("valid JWK set")
}

/// Key set after a rotation: the new key sits next to the old one.
pub fn rotated_jwk_set() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [
            rsa_jwk(ROTATED_KID, ROGUE_MODULUS),
            rsa_jwk(TEST_KID, IDP_MODULUS),
        ]
    }))
    .expect("valid JWK set")
}

/// Valid claims for the test tenant, expiring in an hour.
pub fn claims(permissions: &[&str]) -> Value {
    let now = get_current_timestamp();
    json!({
        "sub": "auth0|barista",
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// Sign `payload` with the published key.
pub fn sign(payload: &Value) -> String {
    sign_with(IDP_KEY_PEM, Some(TEST_KID), payload)
}

/// Sign `payload` with an arbitrary RSA key and key id.
pub fn sign_with(pem: &[u8], kid: Option<&str>, payload: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem).expect("valid RSA PEM");
    encode(&header, payload, &key).expect("token encodes")
}

/// Verifier for the test tenant that never touches the network.
pub fn local_verifier() -> TokenVerifier {
    TokenVerifier::new(
        VerifierConfig::for_domain(TEST_DOMAIN, TEST_AUDIENCE),
        JwksManager::from_local(jwk_set()),
    )
}

/// Application state over a fresh database. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = DrinkStore::open(&temp_dir.path().join("drinks.redb")).expect("store opens");
    (AppState::new(store, local_verifier()), temp_dir)
}

#[derive(Clone)]
struct JwksEndpoint {
    status: StatusCode,
    jwks: Arc<JwkSet>,
    hits: Arc<AtomicUsize>,
}

async fn serve_jwks(State(endpoint): State<JwksEndpoint>) -> (StatusCode, Json<JwkSet>) {
    endpoint.hits.fetch_add(1, Ordering::SeqCst);
    (endpoint.status, Json((*endpoint.jwks).clone()))
}

/// Serve `jwks` on a loopback port. Returns the JWKS URL and a request
/// counter.
pub async fn spawn_jwks_server(status: StatusCode, jwks: JwkSet) -> (Url, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let endpoint = JwksEndpoint {
        status,
        jwks: Arc::new(jwks),
        hits: Arc::clone(&hits),
    };
    let app = Router::new()
        .route("/.well-known/jwks.json", get(serve_jwks))
        .with_state(endpoint);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let url = Url::parse(&format!("http://{addr}/.well-known/jwks.json")).expect("valid URL");
    (url, hits)
}

/// Collect a response body as JSON.
pub async fn to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde_json::json;

use vendora_core::auth::{AuthCrypto, SigningKeyRing};
use vendora_core::clock::ManualClock;
use vendora_core::identity::{
    Account, AccountId, IdentityLookup, IdentityStoreError,
    InMemoryIdentityStore, Role,
};
use vendora_server::create_app;
use vendora_server::infra::app_state::AppState;

pub const T0: i64 = 1_700_000_000;
pub const TTL_SECS: i64 = 3600;
pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "CorrectHorseBattery1!";
const SIGNING_KEY: &[u8] = b"integration-signing-key-0123456789";

/// Router plus handles on the pieces a test may want to poke.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub keys: SigningKeyRing,
}

impl TestApp {
    /// One vendor account `u1` / `a@b.com`.
    pub fn seeded() -> Self {
        let crypto =
            Arc::new(AuthCrypto::insecure_fast("test-pepper").unwrap());
        let store = InMemoryIdentityStore::new().with_account(Account {
            id: AccountId::new("u1"),
            email: EMAIL.to_string(),
            password_hash: crypto.hash_password(PASSWORD).unwrap(),
            role: Role::new("vendor"),
        });
        Self::with_store(Arc::new(store), crypto)
    }

    /// Backed by a store that always fails.
    pub fn with_broken_store() -> Self {
        let crypto =
            Arc::new(AuthCrypto::insecure_fast("test-pepper").unwrap());
        Self::with_store(Arc::new(UnreachableStore), crypto)
    }

    fn with_store(
        store: Arc<dyn IdentityLookup>,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        let clock = Arc::new(ManualClock::at_timestamp(T0));
        let keys = SigningKeyRing::from_secret(SIGNING_KEY).unwrap();
        let state = AppState::assemble(
            store,
            crypto,
            keys.clone(),
            clock.clone(),
            Duration::seconds(TTL_SECS),
        );
        Self {
            router: create_app(state),
            clock,
            keys,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        self.send(login_request(email, password)).await
    }
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

pub fn session_request(bearer: Option<&str>) -> Request<Body> {
    let mut builder =
        Request::builder().method("GET").uri("/api/v1/auth/session");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[derive(Debug)]
struct UnreachableStore;

#[async_trait]
impl IdentityLookup for UnreachableStore {
    async fn find_by_normalized_identifier(
        &self,
        _identifier: &str,
    ) -> Result<Option<Account>, IdentityStoreError> {
        Err(IdentityStoreError::Unavailable("connection refused".into()))
    }
}

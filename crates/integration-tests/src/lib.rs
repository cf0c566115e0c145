//! Integration tests for Moda Brasil.
//!
//! Everything runs in-process against the in-memory document store and
//! session store; no database or network is needed.
//!
//! ```bash
//! cargo test -p moda-brasil-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `attribution` - Referral capture, profile attribution and commissions
//!   through the services
//! - `http_api` - The same flows through the HTTP router

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use moda_brasil_storefront::config::{SentryConfig, StorefrontConfig};
use moda_brasil_storefront::middleware::create_session_layer;
use moda_brasil_storefront::state::AppState;
use moda_brasil_storefront::store::{DocumentStore, MemoryStore};

/// Public URL used for generated links.
pub const BASE_URL: &str = "http://localhost:3000";

/// Storefront configuration for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: std::net::Ipv4Addr::LOCALHOST.into(),
        port: 3000,
        base_url: BASE_URL.to_string(),
        partner_commission_percent: Decimal::from(10),
        sentry: SentryConfig::default(),
    }
}

/// An in-process storefront.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let config = test_config();
        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config);
        let router = moda_brasil_storefront::app(AppState::new(config, shared), session_layer, false);
        Self { router, store }
    }

    /// A client with its own cookie jar, i.e. one browser.
    #[must_use]
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookies: BTreeMap::new(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A cookie held by a [`Browser`].
struct StoredCookie {
    value: String,
    /// Has `Max-Age` or `Expires`, so it survives a browser restart.
    persistent: bool,
}

/// One visitor's browser: keeps cookies between requests.
pub struct Browser {
    router: Router,
    cookies: BTreeMap<String, StoredCookie>,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl Browser {
    /// Send a request with an optional JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, "integration-test");
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, c)| format!("{name}={}", c.value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for set_cookie in response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
        {
            self.store_cookie(set_cookie);
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    /// Close and reopen the browser: session-lifetime cookies are dropped.
    pub fn restart(&mut self) {
        self.cookies.retain(|_, c| c.persistent);
    }

    /// Whether the browser holds a cookie called `name`.
    #[must_use]
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';').map(str::trim);
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let persistent = parts.any(|attr| {
            let attr = attr.to_ascii_lowercase();
            attr.starts_with("max-age") || attr.starts_with("expires")
        });
        self.cookies.insert(
            name.to_owned(),
            StoredCookie {
                value: value.to_owned(),
                persistent,
            },
        );
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }
}

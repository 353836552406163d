use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::store::{MemoryStore, PokemonStore};

/// In-process router over a store (a fresh memory store by default), driven with `oneshot`
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// Router over a caller-supplied store, e.g. one that always fails
    pub fn with_store(store: Arc<dyn PokemonStore>, config: AppConfig) -> Self {
        Self {
            router: app(AppState::new(store), &config),
        }
    }

    /// Send a request with an optional JSON body, returning the raw response
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.router.clone().oneshot(request).await.expect("infallible")
    }

    /// Send a request and decode the JSON response body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, Self::json_body(response).await)
    }

    /// Send a body verbatim, labelled as JSON whether or not it parses
    pub async fn send_raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");

        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        (status, Self::json_body(response).await)
    }

    /// Decode a response body as JSON; empty bodies become `Value::Null`
    pub async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        if bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&bytes).expect("JSON body")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

use axum::{
    body::{to_bytes, Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Default largest body buffered for caching; bigger responses pass through uncached
const MAX_CACHED_BODY: usize = 8 * 1024 * 1024;

#[derive(Clone)]
struct CachedResponse {
    headers: HeaderMap,
    body: Bytes,
    expires_at: Instant,
}

/// Short-lived cache of successful GET responses, keyed by path and query
#[derive(Clone)]
pub struct ResponseCache {
    ttl: Duration,
    max_body: usize,
    entries: Arc<RwLock<HashMap<String, CachedResponse>>>,
    /// Bumped on every invalidation; reads started before a write are not stored
    generation: Arc<AtomicU64>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_body: MAX_CACHED_BODY,
            entries: Arc::new(RwLock::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> Option<CachedResponse> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .cloned()
    }

    async fn put(&self, key: String, headers: HeaderMap, body: Bytes, generation: u64) {
        let mut entries = self.entries.write().await;
        if self.generation() != generation {
            return;
        }
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);
        entries.insert(
            key,
            CachedResponse {
                headers,
                body,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop every cached entry
    pub async fn invalidate(&self) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if !entries.is_empty() {
            tracing::debug!("Invalidating {} cached responses", entries.len());
            entries.clear();
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn cache_key(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Serves repeated GETs from the cache and clears it after successful writes
pub async fn cache_middleware(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();

    if method != Method::GET {
        let mutating = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(&method);
        let response = next.run(request).await;
        if mutating && response.status().is_success() {
            cache.invalidate().await;
        }
        return response;
    }

    let key = cache_key(&request);
    if let Some(hit) = cache.get(&key).await {
        tracing::debug!("Cache hit for {}", key);
        let mut response = (StatusCode::OK, hit.headers, hit.body).into_response();
        response.headers_mut().insert("x-cache", HeaderValue::from_static("HIT"));
        return response;
    }

    let generation = cache.generation();
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    // Only bodies of known, bounded size are buffered
    let fits = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|len| len <= cache.max_body as u64);
    if !fits {
        tracing::debug!("Not caching {}: body too large or unsized", key);
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, cache.max_body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to buffer response for caching: {}", e);
            return ApiError::internal_server_error("Failed to format response").into_response();
        }
    };

    cache.put(key, parts.headers.clone(), bytes.clone(), generation).await;
    parts.headers.insert("x-cache", HeaderValue::from_static("MISS"));
    Response::from_parts(parts, Body::from(bytes))
}

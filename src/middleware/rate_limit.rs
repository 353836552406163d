use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Default number of callers tracked individually
const DEFAULT_MAX_CALLERS: usize = 10_000;

/// Budget shared by new callers once every individual slot is taken
const OVERFLOW_KEY: &str = "*";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of admitting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Default)]
struct Buckets {
    windows: HashMap<String, Window>,
    /// Earliest instant at which a tracked window can expire
    next_sweep: Option<Instant>,
}

impl Buckets {
    fn sweep(&mut self, now: Instant, window: Duration) {
        if matches!(self.next_sweep, Some(at) if now < at) {
            return;
        }
        self.windows.retain(|_, w| now.duration_since(w.started) < window);
        self.next_sweep = self.windows.values().map(|w| w.started + window).min();
    }
}

/// Fixed-window request budget per caller.
///
/// At most `max_callers` callers get their own window (plus one shared
/// overflow window), so the map stays bounded however many distinct keys
/// arrive. Slots are reclaimed once their windows expire.
#[derive(Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    max_callers: usize,
    trust_forwarded_for: bool,
    buckets: Arc<Mutex<Buckets>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            max_callers: DEFAULT_MAX_CALLERS,
            trust_forwarded_for: false,
            buckets: Arc::new(Mutex::new(Buckets::default())),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.rate_limit_requests, Duration::from_secs(api.rate_limit_window_secs))
            .with_max_callers(api.rate_limit_max_callers)
            .trusting_forwarded_for(api.trust_forwarded_for)
    }

    pub fn with_max_callers(mut self, max_callers: usize) -> Self {
        self.max_callers = max_callers.max(1);
        self
    }

    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn admit(&self, caller: &str) -> Admission {
        self.admit_at(caller, Instant::now()).await
    }

    async fn admit_at(&self, caller: &str, now: Instant) -> Admission {
        let mut buckets = self.buckets.lock().await;

        let mut key = caller;
        if !buckets.windows.contains_key(caller) && buckets.windows.len() >= self.max_callers {
            buckets.sweep(now, self.window);
            if buckets.windows.len() >= self.max_callers {
                tracing::debug!("Rate limiter full, {} shares the overflow budget", caller);
                key = OVERFLOW_KEY;
            }
        }

        let entry = buckets.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.limit {
            let elapsed = now.duration_since(entry.started);
            return Admission::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        Admission::Allowed {
            remaining: self.limit - entry.count,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.buckets.lock().await.windows.len()
    }
}

/// Identify the caller: the peer address, or the first X-Forwarded-For hop
/// when the deployment sits behind a trusted proxy
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| trust_forwarded_for)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Middleware applying the per-caller budget before the handler runs
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let caller = caller_key(request.headers(), peer, limiter.trust_forwarded_for);

    match limiter.admit(&caller).await {
        Admission::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(limiter.limit()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        Admission::Limited { retry_after } => {
            // Round up so clients never retry inside the window
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            tracing::warn!("Rate limit exceeded for {} (retry in {}s)", caller, secs);

            let mut response = ApiError::too_many_requests(format!(
                "Rate limit exceeded: {} requests per {} seconds",
                limiter.limit,
                limiter.window.as_secs()
            ))
            .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}

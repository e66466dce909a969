//! Per-client token bucket limiter for the `/api` routes.
//!
//! Each client IP owns a bucket holding one minute of quota that refills
//! continuously. The IP is the peer address of the connection. The first
//! `X-Forwarded-For` entry is used instead only when the limiter is told to
//! trust it, which is the case behind a reverse proxy.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Buckets kept before idle (full) ones are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn full(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, rate: f64, capacity: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_update = now;
    }
}

pub struct IpRateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    capacity: f64,
    /// Tokens per second.
    rate: f64,
    trust_forwarded: bool,
}

impl IpRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute.max(1) as f64;
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            rate: capacity / 60.0,
            trust_forwarded: false,
        }
    }

    /// Key clients on `X-Forwarded-For` when the proxy in front sets it.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Take one token for `client`; false when its quota is spent.
    pub fn try_acquire(&self, client: &str) -> bool {
        let mut buckets = self.lock_buckets();

        if buckets.len() >= PRUNE_THRESHOLD {
            let (rate, capacity) = (self.rate, self.capacity);
            buckets.retain(|_, bucket| {
                bucket.refill(rate, capacity);
                bucket.tokens < capacity
            });
        }

        let bucket = buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::full(self.capacity));
        bucket.refill(self.rate, self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

fn client_ip(request: &Request, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request, limiter.trust_forwarded);
    if !limiter.try_acquire(&client) {
        tracing::debug!("Rate limit hit for {}", client);
        return ApiError::TooManyRequests.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_quota_is_per_client() {
        let limiter = IpRateLimiter::new(2);
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(!limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.2"));
    }

    fn request_from(peer: &str, forwarded: Option<&str>) -> Request {
        let mut builder = Request::builder();
        if let Some(forwarded) = forwarded {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let peer: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    #[test]
    fn test_client_ip_ignores_forwarded_header_by_default() {
        let request = request_from("192.0.2.9:5000", Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&request, false), "192.0.2.9");
    }

    #[test]
    fn test_client_ip_uses_forwarded_header_when_trusted() {
        let request = request_from("192.0.2.9:5000", Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&request, true), "203.0.113.7");

        let request = request_from("192.0.2.9:5000", None);
        assert_eq!(client_ip(&request, true), "192.0.2.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request, false), "unknown");

        let peer: SocketAddr = "192.0.2.5:4711".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&request, false), "192.0.2.5");
    }
}

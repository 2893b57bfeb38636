//! Fixed window rate limiting per client IP

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use http::{Extensions, HeaderMap};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::AppError;
use crate::core::ServerState;
use crate::security_log;

pub const LOGIN_ROUTE: &str = "login";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const API_ROUTE: &str = "api";

/// Requests allowed per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitRule {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

struct IpEntry {
    count: u32,
    window_start: Instant,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Seconds until the current window closes
    Limited { retry_after_secs: u64 },
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn check(&self, route: &'static str, ip: &str, rule: RateLimitRule) -> RateDecision {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();
        let window = Duration::from_secs(rule.window_secs);

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);
        if entry.count <= rule.max_requests {
            RateDecision::Allowed
        } else {
            let elapsed = now.duration_since(entry.window_start);
            let remaining = window.saturating_sub(elapsed).as_secs().max(1);
            RateDecision::Limited {
                retry_after_secs: remaining,
            }
        }
    }

    /// Drop entries whose window started more than `max_age` ago
    pub async fn cleanup(&self, max_age: Duration) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < max_age);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }

    /// Number of tracked IPs for a route
    pub async fn tracked(&self, route: &'static str) -> usize {
        self.inner
            .lock()
            .await
            .get(route)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

/// Client IP as seen by this server
///
/// The socket peer address is authoritative. `X-Forwarded-For` is honoured only
/// when the peer is the configured trusted proxy.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted_proxy: Option<IpAddr>,
) -> Option<IpAddr> {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());

    if peer.is_some() && peer == trusted_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    peer
}

/// Rate limit key for a request; `unknown` without a peer address
pub fn extract_ip(request: &Request, trusted_proxy: Option<IpAddr>) -> String {
    client_ip(request.headers(), request.extensions(), trusted_proxy)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn enforce(
    state: &ServerState,
    route: &'static str,
    rule: RateLimitRule,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request, state.config.trusted_proxy);
    match state.rate_limiter.check(route, &ip, rule).await {
        RateDecision::Allowed => Ok(next.run(request).await),
        RateDecision::Limited { retry_after_secs } => {
            security_log!(
                "WARN",
                "rate_limited",
                route = route,
                ip = ip,
                retry_after_secs = retry_after_secs
            );
            let message = if route == LOGIN_ROUTE {
                "Demasiados intentos de login. Intenta de nuevo más tarde."
            } else {
                "Demasiadas peticiones. Intenta de nuevo más tarde."
            };
            let mut err = AppError::too_many_requests(retry_after_secs);
            err.message = message.to_string();
            Err(err)
        }
    }
}

/// Login attempts per IP (`LOGIN_RATE_LIMIT` per `LOGIN_RATE_WINDOW_SECS`)
///
/// Layered over the whole app; only `POST /api/auth/login` is counted.
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() != http::Method::POST || request.uri().path() != LOGIN_PATH {
        return Ok(next.run(request).await);
    }
    let rule = state.config.login_rate;
    enforce(&state, LOGIN_ROUTE, rule, request, next).await
}

/// General API requests per IP (`API_RATE_LIMIT` per `API_RATE_WINDOW_SECS`)
pub async fn api_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !request.uri().path().starts_with("/api/") {
        return Ok(next.run(request).await);
    }
    let rule = state.config.api_rate;
    enforce(&state, API_ROUTE, rule, request, next).await
}

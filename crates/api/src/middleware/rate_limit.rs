//! Login rate limiting.
//!
//! PIN attempts are limited per client, keyed by the first `X-Forwarded-For`
//! address, then `X-Real-IP`, then a shared anonymous bucket.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

use crate::app::AppState;
use crate::error::ApiError;

/// Bucket used when no client address header is present.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Per-client login limiter.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            rate_limit_per_minute,
        })
    }

    /// Checks one attempt for `client`. On refusal returns the seconds to wait.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        self.limiter.check_key(&client.to_string()).map_err(|not_until| {
            let clock = governor::clock::DefaultClock::default();
            not_until.wait_time_from(clock.now()).as_secs().max(1)
        })
    }

    /// Drops state for clients whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Identifies the client for rate limiting.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

/// Middleware that limits login attempts per client.
pub async fn login_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref limiter) = state.login_limiter {
        let client = client_key(req.headers());
        if let Err(retry_after_secs) = limiter.check(&client) {
            tracing::warn!(client = %client, retry_after_secs, "Login rate limit exceeded");
            return ApiError::RateLimited { retry_after_secs }.into_response();
        }
    }

    next.run(req).await
}

//! Per-actor throttling for mutating routes.
//!
//! A fixed window per actor: the first request in a window stamps the
//! window start, subsequent requests increment a counter, and the counter
//! resets once the window has elapsed. Purely in-process state; restarting
//! the server clears it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{Extension, extract::Request, extract::State, middleware::Next, response::Response};

use super::{ApiError, AppState};
use crate::config::RateLimitConfig;
use crate::services::Actor;

#[derive(Debug, Clone, Copy)]
struct WindowState {
    window_start: Instant,
    count: u32,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Register one request for `actor`; false when the actor has exhausted
    /// the current window.
    pub fn check(&self, actor: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");

        let state = windows.entry(actor.to_string()).or_insert(WindowState {
            window_start: now,
            count: 0,
        });

        if now.duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.count = 0;
        }

        state.count += 1;
        state.count <= self.max_requests
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.rate_limiter().check(&actor.username) {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::TooManyRequests(
            "Rate limit exceeded, try again later".to_string(),
        ))
    }
}

//! In-memory login attempt limiting.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<String, VecDeque<Instant>>`,
//! keyed by normalized username. Every attempt counts, successful or not, so
//! a password-guessing client cannot reset its window by mixing in a valid
//! login.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("too many login attempts (max {limit} per {window_secs}s)")]
pub struct RateLimitError {
    pub limit: usize,
    pub window_secs: u64,
}

#[derive(Clone)]
pub struct LoginRateLimiter {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    limit: usize,
    window: Duration,
}

impl LoginRateLimiter {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), limit, window }
    }

    /// Check the key's window, then record the attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] when the key already used its quota.
    pub fn check_and_record(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(key, Instant::now())
    }

    fn check_and_record_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        // Drop idle keys so the map does not grow with every username ever tried.
        inner.retain(|_, deque| {
            prune_window(deque, now, self.window);
            !deque.is_empty()
        });

        let deque = inner.entry(key.to_owned()).or_default();
        if deque.len() >= self.limit {
            return Err(RateLimitError { limit: self.limit, window_secs: self.window.as_secs() });
        }
        deque.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;

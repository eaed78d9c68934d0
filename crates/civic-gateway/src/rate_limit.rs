// SPDX-FileCopyrightText: 2026 Civic Assistant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session sliding-window rate limiting for the chat endpoint.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Allows at most `max_requests` per key within any `window`.
#[derive(Debug)]
pub struct SessionRateLimiter {
    hits: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl SessionRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            hits: DashMap::new(),
            max_requests: max_requests as usize,
            window,
        }
    }

    /// Records a request for `key`. Returns false when the key is over its
    /// budget; rejected requests are not recorded.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.hits.entry(key.to_string()).or_default();
        let hits = entry.value_mut();
        while hits
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }

    /// Drops keys with no hits inside the window.
    /// Call periodically to prevent unbounded growth.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|t| now.duration_since(*t) < self.window)
        });
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

//! Sliding-window login throttle.
//!
//! Keyed by client address. Every attempt counts against the budget, whether
//! it succeeds or fails: attempt N+1 within the window is rejected even if
//! attempt N authenticated successfully.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a throttle check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Rejected,
}

/// Injected throttle interface (spec'd as `increment-and-check`).
///
/// Implementations must serialize increments per key under concurrent
/// bursts; a naive read-then-write over shared state is not acceptable.
pub trait LoginThrottle: Send + Sync {
    /// Count one attempt against `key` and decide whether it may proceed.
    fn check_and_count(&self, key: &str) -> ThrottleDecision;
}

/// In-memory sliding-window throttle.
///
/// Attempts per key are kept as timestamps; on each check, entries older
/// than the window are dropped, then the attempt is admitted iff fewer than
/// `limit` attempts remain. The whole read-prune-push sequence runs under
/// one lock, so concurrent attempts against the same key serialize.
pub struct SlidingWindowThrottle {
    limit: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

/// Default budget: 5 attempts per 60-second window.
pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

impl SlidingWindowThrottle {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn check_and_count_at(&self, key: &str, now: Instant) -> ThrottleDecision {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let entry = attempts.entry(key.to_string()).or_default();

        while let Some(&oldest) = entry.front() {
            if now.duration_since(oldest) >= self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.limit {
            return ThrottleDecision::Rejected;
        }

        entry.push_back(now);
        ThrottleDecision::Allowed
    }
}

impl Default for SlidingWindowThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl LoginThrottle for SlidingWindowThrottle {
    fn check_and_count(&self, key: &str) -> ThrottleDecision {
        self.check_and_count_at(key, Instant::now())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_never_throttled() {
        let throttle = SlidingWindowThrottle::new(1, Duration::from_secs(60));
        assert_eq!(
            throttle.check_and_count("10.0.0.1"),
            ThrottleDecision::Allowed
        );
    }

    #[test]
    fn rejects_once_budget_exceeded() {
        let throttle = SlidingWindowThrottle::new(3, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..3 {
            assert_eq!(
                throttle.check_and_count_at("10.0.0.1", now),
                ThrottleDecision::Allowed
            );
        }
        assert_eq!(
            throttle.check_and_count_at("10.0.0.1", now),
            ThrottleDecision::Rejected
        );
    }

    #[test]
    fn keys_are_independent() {
        let throttle = SlidingWindowThrottle::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert_eq!(
            throttle.check_and_count_at("10.0.0.1", now),
            ThrottleDecision::Allowed
        );
        assert_eq!(
            throttle.check_and_count_at("10.0.0.2", now),
            ThrottleDecision::Allowed
        );
        assert_eq!(
            throttle.check_and_count_at("10.0.0.1", now),
            ThrottleDecision::Rejected
        );
    }

    #[test]
    fn window_slides() {
        let throttle = SlidingWindowThrottle::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert_eq!(
            throttle.check_and_count_at("k", start),
            ThrottleDecision::Allowed
        );
        assert_eq!(
            throttle.check_and_count_at("k", start + Duration::from_secs(30)),
            ThrottleDecision::Rejected
        );
        assert_eq!(
            throttle.check_and_count_at("k", start + Duration::from_secs(61)),
            ThrottleDecision::Allowed
        );
    }

    #[test]
    fn concurrent_bursts_never_exceed_budget() {
        use std::sync::Arc;

        let throttle = Arc::new(SlidingWindowThrottle::new(5, Duration::from_secs(60)));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let throttle = Arc::clone(&throttle);
            handles.push(std::thread::spawn(move || {
                (throttle.check_and_count("burst") == ThrottleDecision::Allowed) as usize
            }));
        }
        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 5);
    }
}

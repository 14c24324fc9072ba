//! Request pacing for the text-generation service
//!
//! The service is shared by every variant run, so pacing lives with the
//! client rather than with whoever launches the runs.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Throttle and retry policy owned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlePolicy {
    /// Minimum spacing between two requests (milliseconds)
    pub min_interval_ms: u64,

    /// Pause between two consecutive variant runs (seconds)
    pub variant_cooldown_secs: u64,

    /// Attempts per request; 1 disables retries
    pub max_attempts: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    pub backoff_base_ms: u64,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            min_interval_ms: 0,
            variant_cooldown_secs: 5,
            max_attempts: 1,
            backoff_base_ms: 1_000,
        }
    }
}

impl ThrottlePolicy {
    /// Policy with no pacing at all (tests, dry runs)
    pub fn unthrottled() -> Self {
        Self {
            min_interval_ms: 0,
            variant_cooldown_secs: 0,
            max_attempts: 1,
            backoff_base_ms: 0,
        }
    }

    /// Minimum spacing between two requests
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Pause between two variant runs
    pub fn variant_cooldown(&self) -> Duration {
        Duration::from_secs(self.variant_cooldown_secs)
    }

    /// Delay before retry number `attempt` (1-based): base, 2×base, 4×base, ...
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << exponent))
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Tracks when the last request was sent
#[derive(Debug, Default)]
pub(crate) struct RequestClock {
    last_request: Mutex<Option<Instant>>,
}

impl RequestClock {
    /// Time to wait before the next request may go out, and mark it as sent
    ///
    /// The slot is reserved immediately so two callers never get the same one.
    pub(crate) fn reserve(&self, min_interval: Duration) -> Duration {
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        let wait = match *last {
            Some(previous) => (previous + min_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        };
        *last = Some(now + wait);
        wait
    }
}

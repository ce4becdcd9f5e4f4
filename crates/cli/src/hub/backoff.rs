// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential reconnect backoff with additive jitter.

use std::time::Duration;

use rand::Rng;

/// Reconnect delay policy.
///
/// The delay for attempt `n` (zero-based) is `min(base * 2^n, max)`, plus a
/// uniformly random jitter in `[0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            base: Duration::from_secs(1),
            max: Duration::from_secs(30),
            jitter: Duration::from_secs(1),
        }
    }
}

impl Backoff {
    /// Delay before attempt `attempt`, without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Delay before attempt `attempt`, with jitter from the thread RNG.
    pub fn jittered(&self, attempt: u32) -> Duration {
        self.jittered_with(attempt, &mut rand::thread_rng())
    }

    pub fn jittered_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng.gen_range(0..jitter_ms))
        };
        self.delay(attempt) + jitter
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;

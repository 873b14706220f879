//! Bookkeeping for GitHub's hourly request quota

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Values reported by the most recent response, plus when we last asked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
    /// Unix epoch seconds
    pub reset_epoch_seconds: Option<i64>,
    pub last_attempt: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: RateLimitState,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RateLimitState {
        self.state
    }

    pub fn record_attempt(&mut self, at: DateTime<Utc>) {
        self.state.last_attempt = Some(at);
    }

    /// Overwrite all three values from a response, whatever its status.
    ///
    /// A missing header clears the stored value; so does one that is not an integer.
    pub fn update(&mut self, limit: Option<&str>, remaining: Option<&str>, reset: Option<&str>) {
        debug!(header = LIMIT_HEADER, value = ?limit, "Rate limit header");
        debug!(header = REMAINING_HEADER, value = ?remaining, "Rate limit header");
        debug!(header = RESET_HEADER, value = ?reset, "Rate limit header");

        self.state.limit = parse_header(LIMIT_HEADER, limit);
        self.state.remaining = parse_header(REMAINING_HEADER, remaining);
        self.state.reset_epoch_seconds = parse_header(RESET_HEADER, reset);
    }

    /// False until a remaining count has been seen
    pub fn has_exceeded_limit(&self) -> bool {
        self.state.remaining.is_some_and(|remaining| remaining <= 0)
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .reset_epoch_seconds
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
    }

    /// Whole minutes from the last attempt until the quota resets, plus one so a
    /// countdown never shows zero. `None` before an attempt and a reset time are known.
    pub fn minutes_until_reset(&self) -> Option<i64> {
        let reset_millis = self.state.reset_epoch_seconds?.checked_mul(1000)?;
        let last_attempt = self.state.last_attempt?.timestamp_millis();

        let remaining_millis = reset_millis.checked_sub(last_attempt)?;
        Some(remaining_millis.div_euclid(60_000) + 1)
    }

    /// Quota exhausted and the reset time still ahead of `now`
    pub fn is_throttled(&self, now: DateTime<Utc>) -> bool {
        self.has_exceeded_limit() && self.reset_at().is_some_and(|reset| reset > now)
    }
}

fn parse_header(name: &'static str, value: Option<&str>) -> Option<i64> {
    let value = value?;
    match value.trim().parse::<i64>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(header = name, value, error = %e, "Ignoring non-integer rate limit header");
            None
        },
    }
}

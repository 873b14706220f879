//! Consecutive failure gating

use compact_str::CompactString;
use tracing::debug;

/// Number of consecutive failures that are still reported
pub const FAILURES_ALLOWED: u32 = 5;

/// Whether a failure was handed to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    Reported,
    Suppressed,
}

#[derive(Debug)]
pub struct FailureCounter {
    count: u32,
    allowed: u32,
}

impl Default for FailureCounter {
    fn default() -> Self {
        Self { count: 0, allowed: FAILURES_ALLOWED }
    }
}

impl FailureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_under_limit(&self) -> bool {
        self.count < self.allowed
    }

    pub fn on_success(&mut self) {
        if self.count > 0 {
            debug!(previous_failures = self.count, "Resetting failure count");
        }
        self.count = 0;
    }

    /// Count and report a failure, or drop it silently once the limit is reached.
    ///
    /// Past the limit nothing is incremented and `report` is not called.
    pub fn on_failure<E>(
        &mut self,
        status: u16,
        message: Option<CompactString>,
        report: impl FnOnce(u16, Option<CompactString>) -> Result<(), E>,
    ) -> Result<FailureVerdict, E> {
        if !self.is_under_limit() {
            debug!(status, count = self.count, "Failure limit reached, suppressing report");
            return Ok(FailureVerdict::Suppressed);
        }

        self.count += 1;
        report(status, message)?;
        Ok(FailureVerdict::Reported)
    }
}

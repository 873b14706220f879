//! GitHub client modules
//!
//! The transport, the per-response bookkeeping (rate limit, failure gating,
//! snapshot diffing) and the poller that ties one cycle together.

pub mod api;
pub mod config;
pub mod error;
pub mod failure;
pub mod poller;
pub mod processor;
pub mod rate_limit;

// Re-export main types for convenience
pub use api::{GithubApi, RawResponse, Transport};
pub use config::{ClientConfig, PollingConfig, ProxyPolicy, RequestConfig};
pub use error::{ClientError, Result};
pub use failure::{FAILURES_ALLOWED, FailureCounter, FailureVerdict};
pub use poller::{Poller, log_cycle, run_cycle, spawn_poller};
pub use processor::{CycleOutcome, ResponseClass, ResponseProcessor, classify};
pub use rate_limit::{RateLimitState, RateLimitTracker};

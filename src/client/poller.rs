//! Poll cycles and the background loop that drives them

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, error, info, instrument, warn};

use super::{
    api::Transport,
    config::ClientConfig,
    error::{ClientError, Result},
    processor::{CycleOutcome, ResponseProcessor},
    rate_limit::RateLimitState,
};
use crate::{dispatcher::Dispatcher, event::PulseEvent};

/// Runs poll cycles for one user, one at a time
///
/// All bookkeeping sits behind a single async mutex that is held for the whole
/// cycle, request included. A second `initiate` while one is in flight is
/// rejected rather than queued.
#[derive(Debug)]
pub struct Poller<T> {
    transport: T,
    url: CompactString,
    processor: Mutex<ResponseProcessor>,
}

impl<T: Transport> Poller<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            url: config.repos_url(),
            processor: Mutex::new(ResponseProcessor::new(config)),
        }
    }

    /// Fetch the repository list once and process the response
    #[instrument(skip(self, dispatcher), fields(url = %self.url))]
    pub async fn initiate<D>(&self, dispatcher: &D) -> Result<CycleOutcome>
    where
        D: Dispatcher + ?Sized,
    {
        let mut processor = self
            .processor
            .try_lock()
            .map_err(|_| ClientError::CycleInFlight)?;

        processor
            .rate_limit_mut()
            .record_attempt(Utc::now());

        debug!("Requesting repository list");
        let response = self.transport.get(&self.url).await?;

        processor.process(&response, dispatcher)
    }

    pub fn is_in_flight(&self) -> bool {
        self.processor.try_lock().is_err()
    }

    pub async fn rate_limit(&self) -> RateLimitState {
        self.processor.lock().await.rate_limit().state()
    }

    /// Minutes left in the current rate-limit window, if the quota is spent
    pub async fn throttled_for(&self, now: DateTime<Utc>) -> Option<i64> {
        let processor = self.processor.lock().await;
        let tracker = processor.rate_limit();

        tracker
            .is_throttled(now)
            .then(|| tracker.minutes_until_reset().unwrap_or(1))
    }
}

/// One scheduled cycle: skipped while throttled, otherwise initiated and logged
pub async fn run_cycle<T, D>(poller: &Poller<T>, dispatcher: &D) -> Option<CycleOutcome>
where
    T: Transport,
    D: Dispatcher + ?Sized,
{
    if let Some(minutes_until_reset) = poller.throttled_for(Utc::now()).await {
        info!(minutes_until_reset, "Rate limit exhausted, skipping poll");
        if let Err(e) = dispatcher.dispatch(PulseEvent::RateLimited { minutes_until_reset }) {
            error!(error = %e, "Failed to deliver rate limit notice");
        }
        return None;
    }

    let result = poller.initiate(dispatcher).await;
    log_cycle(&result);
    result.ok()
}

pub fn log_cycle(result: &Result<CycleOutcome>) {
    match result {
        Ok(CycleOutcome::Success { repositories, changes }) => {
            info!(repositories, changes, "Poll cycle completed")
        },
        Ok(CycleOutcome::FailureReported { status }) => {
            warn!(status, "GitHub returned an error response")
        },
        Ok(CycleOutcome::FailureSuppressed { status }) => {
            debug!(status, "GitHub returned an error response, report suppressed")
        },
        Err(ClientError::CycleInFlight) => debug!("Previous poll cycle still in flight"),
        Err(e) if e.is_transport() => error!(error = %e, "Failed to reach GitHub"),
        Err(e) => error!(error = %e, "Problem handling repository response"),
    }
}

/// Poll now and then every `interval` until the returned sender fires
pub fn spawn_poller<T, D>(
    poller: Arc<Poller<T>>,
    dispatcher: D,
    interval: Duration,
) -> (broadcast::Sender<()>, JoinHandle<()>)
where
    T: Transport + Send + Sync + 'static,
    D: Dispatcher + Send + Sync + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(async move {
        poll_loop(poller, dispatcher, interval, &mut shutdown_rx).await;
    });

    (shutdown_tx, handle)
}

#[instrument(skip(poller, dispatcher, shutdown_rx), fields(interval = ?interval))]
async fn poll_loop<T, D>(
    poller: Arc<Poller<T>>,
    dispatcher: D,
    interval: Duration,
    shutdown_rx: &mut broadcast::Receiver<()>,
) where
    T: Transport,
    D: Dispatcher,
{
    info!("Starting repository polling loop");

    loop {
        tokio::select! {
            _ = run_cycle(&poller, &dispatcher) => {}
            _ = shutdown_rx.recv() => break,
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown_rx.recv() => break,
        }
    }

    info!("Repository polling loop ended");
}

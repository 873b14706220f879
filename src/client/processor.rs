//! Turns one repository-list response into rate limit, failure and change bookkeeping

use compact_str::CompactString;
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{
    api::RawResponse,
    config::ClientConfig,
    error::{ClientError, Result},
    failure::{FailureCounter, FailureVerdict},
    rate_limit::{LIMIT_HEADER, RESET_HEADER, REMAINING_HEADER, RateLimitTracker},
};
use crate::{
    dispatcher::Dispatcher,
    domain::{ApiErrorDto, RepoDto, RepoSnapshot},
    event::IntoPulseEvent,
    stores::{DiffEngine, SnapshotStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Failure,
}

/// How a handled cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Success { repositories: usize, changes: usize },
    FailureReported { status: u16 },
    FailureSuppressed { status: u16 },
}

/// Only a plain 200 counts as success
pub fn classify(status: u16) -> ResponseClass {
    if status == 200 { ResponseClass::Success } else { ResponseClass::Failure }
}

#[derive(Debug)]
pub struct ResponseProcessor {
    endpoint: CompactString,
    rate_limit: RateLimitTracker,
    failures: FailureCounter,
    engine: DiffEngine,
}

impl ResponseProcessor {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.repos_url(),
            rate_limit: RateLimitTracker::new(),
            failures: FailureCounter::new(),
            engine: DiffEngine::new(config.html_url.clone(), config.username.clone()),
        }
    }

    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    pub fn rate_limit_mut(&mut self) -> &mut RateLimitTracker {
        &mut self.rate_limit
    }

    pub fn failures(&self) -> &FailureCounter {
        &self.failures
    }

    pub fn store(&self) -> &SnapshotStore {
        self.engine.store()
    }

    /// Handle one response.
    ///
    /// Rate limit values are taken from the headers before anything else, so they
    /// survive a body that fails to decode. Snapshots are only touched once the
    /// whole body decoded as a repository list.
    #[instrument(skip(self, response, dispatcher), fields(status = response.status))]
    pub fn process<D>(&mut self, response: &RawResponse, dispatcher: &D) -> Result<CycleOutcome>
    where
        D: Dispatcher + ?Sized,
    {
        self.rate_limit.update(
            response.header(LIMIT_HEADER),
            response.header(REMAINING_HEADER),
            response.header(RESET_HEADER),
        );

        debug!(status = response.status, "HTTP response status code");

        let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
            ClientError::decode(self.endpoint.clone(), "Response body is not valid JSON", e)
        })?;

        match classify(response.status) {
            ResponseClass::Success => self.handle_success(body, dispatcher),
            ResponseClass::Failure => self.handle_failure(response.status, body, dispatcher),
        }
    }

    fn handle_success<D>(&mut self, body: Value, dispatcher: &D) -> Result<CycleOutcome>
    where
        D: Dispatcher + ?Sized,
    {
        let repos: Vec<RepoDto> = serde_json::from_value(body).map_err(|e| {
            ClientError::decode(self.endpoint.clone(), "Expected a list of repositories", e)
        })?;

        self.failures.on_success();
        dispatcher.dispatch(repos.clone().into_pulse_event())?;

        let mut changes = 0;
        for repo in &repos {
            for change in self
                .engine
                .diff(repo.identity(), RepoSnapshot::from(repo))
            {
                changes += 1;
                dispatcher.dispatch(change.into_pulse_event())?;
            }
        }

        debug!(
            repositories = repos.len(),
            changes,
            names = %repos.iter().map(|repo| &repo.name).join(", "),
            "Repositories processed"
        );

        Ok(CycleOutcome::Success { repositories: repos.len(), changes })
    }

    fn handle_failure<D>(&mut self, status: u16, body: Value, dispatcher: &D) -> Result<CycleOutcome>
    where
        D: Dispatcher + ?Sized,
    {
        let message = serde_json::from_value::<ApiErrorDto>(body)
            .ok()
            .and_then(|error| error.message);

        let verdict = self
            .failures
            .on_failure(status, message, |status, message| {
                dispatcher.dispatch((status, message).into_pulse_event())
            })?;

        Ok(match verdict {
            FailureVerdict::Reported => CycleOutcome::FailureReported { status },
            FailureVerdict::Suppressed => CycleOutcome::FailureSuppressed { status },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::{
        event::{ChangeKind, PulseEvent},
        id::{RepoId, RepoIdentity},
    };

    fn processor() -> ResponseProcessor {
        ResponseProcessor::new(&ClientConfig::new("octocat"))
    }

    fn repos_response(watchers: u64) -> RawResponse {
        let body = format!(
            r#"[{{"id":1,"name":"a","watchers":{watchers},"forks":2,"open_issues":0}}]"#
        );
        RawResponse::new(200, body)
            .with_header("X-RateLimit-Limit", "60")
            .with_header("X-RateLimit-Remaining", "58")
            .with_header("X-RateLimit-Reset", "1700000000")
    }

    fn not_found() -> RawResponse {
        RawResponse::new(404, r#"{"message":"Not Found"}"#).with_header("X-RateLimit-Remaining", "57")
    }

    fn drain(rx: &Receiver<PulseEvent>) -> Vec<PulseEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn only_200_is_success() {
        assert_eq!(classify(200), ResponseClass::Success);
        assert_eq!(classify(201), ResponseClass::Failure);
        assert_eq!(classify(304), ResponseClass::Failure);
        assert_eq!(classify(403), ResponseClass::Failure);
    }

    #[test]
    fn second_poll_reports_watcher_growth() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();

        let first = processor.process(&repos_response(10), &tx).unwrap();
        assert_eq!(first, CycleOutcome::Success { repositories: 1, changes: 0 });
        let events = drain(&rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PulseEvent::RepositoriesLoaded(repos) if repos.len() == 1));

        let second = processor.process(&repos_response(12), &tx).unwrap();
        assert_eq!(second, CycleOutcome::Success { repositories: 1, changes: 1 });
        let changes: Vec<_> = drain(&rx)
            .into_iter()
            .filter_map(|event| match event {
                PulseEvent::RepositoryChanged(change) => Some(change),
                _ => None,
            })
            .collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::WatchersGrown);
        assert_eq!(changes[0].link_url, "https://github.com/octocat/a/watchers");
    }

    #[test]
    fn undecodable_success_body_changes_nothing_but_rate_limit() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();
        let response = RawResponse::new(200, "<html>unicorn</html>")
            .with_header("X-RateLimit-Remaining", "0")
            .with_header("X-RateLimit-Reset", "1700000000");

        let result = processor.process(&response, &tx);

        assert!(matches!(result, Err(ClientError::Decode { .. })));
        assert!(drain(&rx).is_empty());
        assert!(processor.store().is_empty());
        assert!(processor.rate_limit().has_exceeded_limit());
    }

    #[test]
    fn json_that_is_not_a_repo_list_is_a_decode_error() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();
        processor.process(&not_found(), &tx).unwrap();

        let result = processor.process(&RawResponse::new(200, r#"{"id":1}"#), &tx);

        assert!(matches!(result, Err(ClientError::Decode { .. })));
        assert_eq!(processor.failures().count(), 1);
        assert_eq!(drain(&rx).len(), 1);
    }

    #[test]
    fn failures_are_reported_five_times_then_suppressed_until_success() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();

        for _ in 0..5 {
            let outcome = processor.process(&not_found(), &tx).unwrap();
            assert_eq!(outcome, CycleOutcome::FailureReported { status: 404 });
        }
        assert_eq!(
            processor.process(&not_found(), &tx).unwrap(),
            CycleOutcome::FailureSuppressed { status: 404 }
        );

        let reports = drain(&rx);
        assert_eq!(reports.len(), 5);
        assert!(matches!(
            &reports[0],
            PulseEvent::RequestFailed { status: 404, message: Some(m) } if m == "Not Found"
        ));

        processor.process(&repos_response(1), &tx).unwrap();
        assert_eq!(
            processor.process(&not_found(), &tx).unwrap(),
            CycleOutcome::FailureReported { status: 404 }
        );
    }

    #[test]
    fn failure_without_message_is_still_reported() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();

        processor
            .process(&RawResponse::new(502, "[]"), &tx)
            .unwrap();

        assert!(matches!(
            drain(&rx).as_slice(),
            [PulseEvent::RequestFailed { status: 502, message: None }]
        ));
    }

    #[test]
    fn undecodable_failure_body_is_not_reported() {
        let (tx, rx) = mpsc::channel();
        let mut processor = processor();

        let result = processor.process(&RawResponse::new(500, "oops"), &tx);

        assert!(matches!(result, Err(ClientError::Decode { .. })));
        assert!(drain(&rx).is_empty());
        assert_eq!(processor.failures().count(), 0);
    }

    #[test]
    fn departed_consumer_surfaces_as_consumer_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut processor = processor();

        let result = processor.process(&repos_response(10), &tx);

        assert!(matches!(result, Err(ClientError::Consumer(_))));
        assert_eq!(processor.failures().count(), 0);
        assert!(processor.store().is_empty());
    }

    #[test]
    fn snapshots_are_keyed_by_id_and_name() {
        let (tx, _rx) = mpsc::channel();
        let mut processor = processor();

        processor.process(&repos_response(10), &tx).unwrap();

        assert!(
            processor
                .store()
                .get(&RepoIdentity::new(RepoId::new(1), "a"))
                .is_some()
        );
    }
}

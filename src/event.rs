use std::fmt::{self, Display};

use compact_str::CompactString;

use crate::domain::{Metric, RepoDto};

/// Direction-typed notification kinds, one per metric and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    WatchersGrown,
    WatchersFallen,
    IssuesGrown,
    IssuesFallen,
    ForksGrown,
    ForksFallen,
}

/// One metric delta for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub content: CompactString,
    pub link_url: CompactString,
}

#[derive(Debug, Clone)]
pub enum PulseEvent {
    RepositoriesLoaded(Vec<RepoDto>),
    RequestFailed { status: u16, message: Option<CompactString> },
    RepositoryChanged(ChangeEvent),
    RateLimited { minutes_until_reset: i64 },
}

impl ChangeKind {
    pub fn grown(metric: Metric) -> Self {
        match metric {
            Metric::Watchers => ChangeKind::WatchersGrown,
            Metric::OpenIssues => ChangeKind::IssuesGrown,
            Metric::Forks => ChangeKind::ForksGrown,
        }
    }

    pub fn fallen(metric: Metric) -> Self {
        match metric {
            Metric::Watchers => ChangeKind::WatchersFallen,
            Metric::OpenIssues => ChangeKind::IssuesFallen,
            Metric::Forks => ChangeKind::ForksFallen,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::WatchersGrown => "Watchers Grown",
            ChangeKind::WatchersFallen => "Watchers Fallen",
            ChangeKind::IssuesGrown => "Issues Grown",
            ChangeKind::IssuesFallen => "Issues Fallen",
            ChangeKind::ForksGrown => "Forks Grown",
            ChangeKind::ForksFallen => "Forks Fallen",
        }
    }
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PulseEvent {
    /// Get the variant name as a string slice (without "PulseEvent::" prefix)
    pub fn variant_name(&self) -> &'static str {
        match self {
            PulseEvent::RepositoriesLoaded(_) => "RepositoriesLoaded",
            PulseEvent::RequestFailed { .. } => "RequestFailed",
            PulseEvent::RepositoryChanged(_) => "RepositoryChanged",
            PulseEvent::RateLimited { .. } => "RateLimited",
        }
    }
}

pub trait IntoPulseEvent {
    fn into_pulse_event(self) -> PulseEvent;
}

impl IntoPulseEvent for Vec<RepoDto> {
    fn into_pulse_event(self) -> PulseEvent {
        PulseEvent::RepositoriesLoaded(self)
    }
}

impl IntoPulseEvent for ChangeEvent {
    fn into_pulse_event(self) -> PulseEvent {
        PulseEvent::RepositoryChanged(self)
    }
}

impl IntoPulseEvent for (u16, Option<CompactString>) {
    fn into_pulse_event(self) -> PulseEvent {
        let (status, message) = self;
        PulseEvent::RequestFailed { status, message }
    }
}

use compact_str::CompactString;
use serde::Deserialize;

use crate::id::{RepoId, RepoIdentity};

/// One entry of `GET /users/{username}/repos`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoDto {
    pub id: RepoId,
    pub name: CompactString,
    pub watchers: u64,
    pub open_issues: u64,
    pub forks: u64,
}

/// Error envelope GitHub returns alongside non-200 responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDto {
    #[serde(default)]
    pub message: Option<CompactString>,
}

/// Last observed metrics for one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoSnapshot {
    pub watchers: u64,
    pub forks: u64,
    pub open_issues: u64,
}

/// The repository counters that are compared between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Watchers,
    OpenIssues,
    Forks,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Watchers, Metric::OpenIssues, Metric::Forks];

    /// Path appended to the repository page for this metric
    pub fn link_suffix(&self) -> &'static str {
        match self {
            Metric::Watchers => "/watchers",
            Metric::OpenIssues => "/issues",
            Metric::Forks => "/network",
        }
    }

    pub fn read(&self, snapshot: &RepoSnapshot) -> u64 {
        match self {
            Metric::Watchers => snapshot.watchers,
            Metric::OpenIssues => snapshot.open_issues,
            Metric::Forks => snapshot.forks,
        }
    }
}

impl RepoDto {
    pub fn identity(&self) -> RepoIdentity {
        RepoIdentity::new(self.id, self.name.clone())
    }
}

impl From<&RepoDto> for RepoSnapshot {
    fn from(repo: &RepoDto) -> Self {
        Self {
            watchers: repo.watchers,
            forks: repo.forks,
            open_issues: repo.open_issues,
        }
    }
}

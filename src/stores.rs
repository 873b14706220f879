use std::collections::HashMap;

use compact_str::{CompactString, format_compact};
use tracing::{debug, instrument};

use crate::{
    domain::{Metric, RepoSnapshot},
    event::{ChangeEvent, ChangeKind},
    id::RepoIdentity,
};

/// Last observed metrics per repository, for the lifetime of the process
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<RepoIdentity, RepoSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &RepoIdentity) -> Option<&RepoSnapshot> {
        self.snapshots.get(identity)
    }

    pub fn insert(&mut self, identity: RepoIdentity, snapshot: RepoSnapshot) {
        self.snapshots.insert(identity, snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Compares incoming repository records against the stored snapshots
#[derive(Debug)]
pub struct DiffEngine {
    html_root: CompactString,
    username: CompactString,
    store: SnapshotStore,
}

impl DiffEngine {
    pub fn new(html_root: impl Into<CompactString>, username: impl Into<CompactString>) -> Self {
        Self {
            html_root: html_root.into(),
            username: username.into(),
            store: SnapshotStore::new(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Produce the change events for `identity` and record `incoming` as its snapshot.
    ///
    /// A repository seen for the first time yields no events.
    #[instrument(skip(self, identity, incoming), fields(repo = %identity))]
    pub fn diff(&mut self, identity: RepoIdentity, incoming: RepoSnapshot) -> Vec<ChangeEvent> {
        let events = match self.store.get(&identity) {
            Some(previous) => Metric::ALL
                .iter()
                .filter_map(|metric| self.compare(&identity, *metric, previous, &incoming))
                .collect(),
            None => {
                debug!("First observation, storing snapshot");
                Vec::new()
            },
        };

        self.store.insert(identity, incoming);
        events
    }

    fn compare(
        &self,
        identity: &RepoIdentity,
        metric: Metric,
        previous: &RepoSnapshot,
        incoming: &RepoSnapshot,
    ) -> Option<ChangeEvent> {
        let before = metric.read(previous);
        let after = metric.read(incoming);

        let kind = match after.cmp(&before) {
            std::cmp::Ordering::Less => ChangeKind::fallen(metric),
            std::cmp::Ordering::Greater => ChangeKind::grown(metric),
            std::cmp::Ordering::Equal => return None,
        };

        debug!(kind = %kind, before, after, "Metric changed");

        // new issues carry no content
        let content = match kind {
            ChangeKind::IssuesGrown => CompactString::default(),
            _ => identity.name.clone(),
        };

        Some(ChangeEvent {
            kind,
            content,
            link_url: format_compact!(
                "{}/{}/{}{}",
                self.html_root.trim_end_matches('/'),
                self.username,
                identity.name,
                metric.link_suffix()
            ),
        })
    }
}

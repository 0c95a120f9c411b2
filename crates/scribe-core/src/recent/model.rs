//! Recent-files domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::file::{EntryCheck, FileReference};

/// Maximum number of remembered files.
pub const MAX_RECENT_FILES: usize = 10;

/// One remembered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub reference: FileReference,
    /// When the file was last opened successfully.
    pub opened_at: DateTime<Utc>,
}

impl RecentEntry {
    pub fn new(reference: FileReference) -> Self {
        Self {
            reference,
            opened_at: Utc::now(),
        }
    }
}

/// Recently opened files, most recent first.
///
/// At most [`MAX_RECENT_FILES`] entries and no two entries with the same
/// (resolvable) name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentList {
    entries: Vec<RecentEntry>,
}

impl RecentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored entries, re-establishing the invariants.
    ///
    /// Entries are taken in stored order; a later entry whose name was already
    /// seen is dropped.
    pub fn from_entries(entries: Vec<RecentEntry>) -> Self {
        let mut list = Self::new();
        for entry in entries.into_iter().rev() {
            list.record(entry);
        }
        list
    }

    /// Moves `entry` to the front, superseding any entry with the same name.
    ///
    /// Entries whose name cannot be compared are kept rather than dropped.
    pub fn record(&mut self, entry: RecentEntry) {
        let name = entry.reference.name();
        let mut kept = Vec::with_capacity(self.entries.len() + 1);
        kept.push(entry.clone());

        for existing in self.entries.drain(..) {
            match existing.reference.check_against(name) {
                EntryCheck::Exclude => {}
                EntryCheck::Keep => kept.push(existing),
                EntryCheck::Unknown => {
                    tracing::debug!(
                        "[RecentList] Keeping entry with unresolvable name: {}",
                        existing.reference
                    );
                    kept.push(existing);
                }
            }
        }

        kept.truncate(MAX_RECENT_FILES);
        self.entries = kept;
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&RecentEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.reference.display_name())
            .collect()
    }

    pub fn into_entries(self) -> Vec<RecentEntry> {
        self.entries
    }
}

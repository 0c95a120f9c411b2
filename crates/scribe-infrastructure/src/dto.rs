//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs describe what is actually written into the embedded store.
//! They are private to the infrastructure layer so the domain types can
//! change without silently changing the stored format.
//!
//! ### Recent-files store version history
//! - **1**: Initial schema (`location` + `openedAt` per entry)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use scribe_core::file::FileReference;
use scribe_core::recent::{RecentEntry, RecentList};

/// One stored recent-files entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntryRecord {
    /// Host location of the file.
    pub location: PathBuf,
    /// When the file was last opened.
    pub opened_at: DateTime<Utc>,
}

/// The stored recent-files list, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentListRecord {
    #[serde(default)]
    pub entries: Vec<RecentEntryRecord>,
}

impl From<&RecentEntry> for RecentEntryRecord {
    fn from(entry: &RecentEntry) -> Self {
        Self {
            location: entry.reference.location().to_path_buf(),
            opened_at: entry.opened_at,
        }
    }
}

impl From<RecentEntryRecord> for RecentEntry {
    fn from(record: RecentEntryRecord) -> Self {
        Self {
            reference: FileReference::new(record.location),
            opened_at: record.opened_at,
        }
    }
}

impl From<&RecentList> for RecentListRecord {
    fn from(list: &RecentList) -> Self {
        Self {
            entries: list.entries().iter().map(RecentEntryRecord::from).collect(),
        }
    }
}

impl RecentListRecord {
    /// Converts into the domain list, re-establishing its invariants.
    pub fn into_domain(self) -> RecentList {
        RecentList::from_entries(self.entries.into_iter().map(RecentEntry::from).collect())
    }
}

//! Recent-files repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::recent::model::RecentList;

/// Persistent storage for the recent-files list.
#[async_trait]
pub trait RecentFilesRepository: Send + Sync {
    /// Loads the stored list; an absent record is an empty list.
    async fn get(&self) -> Result<RecentList>;

    /// Replaces the stored list.
    async fn put(&self, list: &RecentList) -> Result<()>;
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use scribe_core::file::AccessMode;

/// Grants given during this process, keyed by file location.
///
/// A `ReadWrite` grant also satisfies `Read`.
#[derive(Debug, Clone, Default)]
pub struct PermissionLedger {
    grants: Arc<RwLock<HashMap<PathBuf, AccessMode>>>,
}

impl PermissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted(&self, location: &Path, mode: AccessMode) -> bool {
        self.grants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .is_some_and(|granted| granted.covers(mode))
    }

    /// Records a grant; never narrows an existing one.
    pub fn grant(&self, location: &Path, mode: AccessMode) {
        let mut grants = self.grants.write().unwrap_or_else(PoisonError::into_inner);
        let entry = grants.entry(location.to_path_buf()).or_insert(mode);
        if !entry.covers(mode) {
            *entry = mode;
        }
    }

    pub fn revoke(&self, location: &Path) {
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(location);
    }

    pub fn revoke_all(&self) {
        self.grants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_grant_covers_read() {
        let ledger = PermissionLedger::new();
        let path = Path::new("/notes/a.txt");

        ledger.grant(path, AccessMode::ReadWrite);
        ledger.grant(path, AccessMode::Read);

        assert!(ledger.granted(path, AccessMode::Read));
        assert!(ledger.granted(path, AccessMode::ReadWrite));
    }

    #[test]
    fn test_read_grant_does_not_cover_write() {
        let ledger = PermissionLedger::new();
        let path = Path::new("/notes/a.txt");

        ledger.grant(path, AccessMode::Read);

        assert!(!ledger.granted(path, AccessMode::ReadWrite));
        assert!(!ledger.granted(Path::new("/notes/b.txt"), AccessMode::Read));
    }

    #[test]
    fn test_revoke() {
        let ledger = PermissionLedger::new();
        let path = Path::new("/notes/a.txt");
        ledger.grant(path, AccessMode::ReadWrite);

        ledger.revoke(path);

        assert!(!ledger.granted(path, AccessMode::Read));
    }
}

//! File sessions running against real files and the on-disk recent-files store.

use std::sync::Arc;

use scribe_core::config::EditorConfig;
use scribe_core::file::FileHost;
use scribe_core::recent::RecentFiles;
use scribe_core::session::{FileSession, SaveOutcome, SessionState, SkipReason};
use scribe_infrastructure::{AutoPrompt, KvRecentFilesRepository, LocalFileHost};
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    dir: std::path::PathBuf,
    host: LocalFileHost,
    session: FileSession,
}

async fn fixture(prompt: AutoPrompt) -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let repository = KvRecentFilesRepository::open(&dir.join("store")).await;
    let recent = Arc::new(RecentFiles::new(Arc::new(repository)));
    Fixture {
        _temp_dir: temp_dir,
        host: LocalFileHost::new(Arc::new(prompt)),
        session: FileSession::new(recent, &EditorConfig::default()),
        dir,
    }
}

#[tokio::test]
async fn open_unlock_edit_save_round_trip() {
    let fx = fixture(AutoPrompt::allow_all()).await;
    let path = fx.dir.join("notes.txt");
    std::fs::write(&path, "first line\n").unwrap();
    let reference = fx.host.reference_for(&path).await.unwrap();

    let view = fx.session.open(fx.host.handle(&reference)).await.unwrap();
    assert_eq!(view.state, SessionState::ReadOnly);
    assert_eq!(view.text, "first line\n");

    fx.session.unlock().await.unwrap();
    fx.session.append("second line\n").await.unwrap();
    assert_eq!(fx.session.save().await.unwrap(), SaveOutcome::Saved);

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "first line\nsecond line\n"
    );
    assert!(!fx.session.is_dirty().await);
}

#[tokio::test]
async fn opened_files_are_remembered_across_restarts() {
    let fx = fixture(AutoPrompt::read_only()).await;
    for name in ["a.txt", "b.txt", "a.txt"] {
        let path = fx.dir.join(name);
        std::fs::write(&path, name).unwrap();
        let reference = fx.host.reference_for(&path).await.unwrap();
        fx.session.open(fx.host.handle(&reference)).await.unwrap();
    }

    let reopened = KvRecentFilesRepository::open(&fx.dir.join("store")).await;
    let names = RecentFiles::new(Arc::new(reopened)).list().await.names();

    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn refused_write_access_keeps_file_read_only() {
    let fx = fixture(AutoPrompt::read_only()).await;
    let path = fx.dir.join("locked.txt");
    std::fs::write(&path, "original").unwrap();
    let reference = fx.host.reference_for(&path).await.unwrap();
    fx.session.open(fx.host.handle(&reference)).await.unwrap();

    let err = fx.session.unlock().await.unwrap_err();

    assert!(err.is_permission_denied());
    let view = fx.session.view().await;
    assert_eq!(view.state, SessionState::ReadOnly);
    assert_eq!(
        fx.session.save().await.unwrap(),
        SaveOutcome::Skipped(SkipReason::NotEditable)
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
}

#[tokio::test]
async fn vanished_file_fails_save_and_keeps_dirty() {
    let fx = fixture(AutoPrompt::allow_all()).await;
    let path = fx.dir.join("notes.txt");
    std::fs::write(&path, "v1").unwrap();
    let reference = fx.host.reference_for(&path).await.unwrap();
    fx.session.open(fx.host.handle(&reference)).await.unwrap();
    fx.session.unlock().await.unwrap();
    fx.session.edit("v2").await.unwrap();

    // Moved away outside the app.
    fx.host.ledger().revoke_all();
    std::fs::remove_file(&path).unwrap();

    assert!(fx.session.save().await.is_err());
    assert!(fx.session.is_dirty().await);
    assert!(!path.exists());
}

#[tokio::test]
async fn deleted_file_fails_open_without_touching_current_session() {
    let fx = fixture(AutoPrompt::allow_all()).await;
    let kept = fx.dir.join("kept.txt");
    std::fs::write(&kept, "kept").unwrap();
    let kept_ref = fx.host.reference_for(&kept).await.unwrap();
    fx.session.open(fx.host.handle(&kept_ref)).await.unwrap();

    let gone = fx.dir.join("gone.txt");
    std::fs::write(&gone, "gone").unwrap();
    let gone_ref = fx.host.reference_for(&gone).await.unwrap();
    std::fs::remove_file(&gone).unwrap();

    assert!(fx.session.open(fx.host.handle(&gone_ref)).await.is_err());
    let view = fx.session.view().await;
    assert_eq!(view.state, SessionState::Failed);
    assert_eq!(view.text, "kept");
}

//! In-memory fakes for files, hosts, pickers and the recent-files store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::{Result, ScribeError};
use crate::file::{
    AccessMode, FileHandle, FileHost, FilePicker, FileReference, PermissionState, WritableFile,
};
use crate::recent::{RecentFilesRepository, RecentList};

#[derive(Default)]
struct MemoryFileState {
    contents: Option<Vec<u8>>,
    granted: Option<AccessMode>,
    answers: HashMap<AccessMode, bool>,
    prompts: usize,
    writes: usize,
    failing_writes: usize,
    commit_gate: Option<Arc<Semaphore>>,
}

/// A file held in memory with scriptable permissions and failures.
///
/// Prompts are refused unless [`MemoryFile::answer`] says otherwise.
pub struct MemoryFile {
    reference: FileReference,
    state: Arc<Mutex<MemoryFileState>>,
    waiting_commits: Arc<AtomicUsize>,
}

impl MemoryFile {
    pub fn new(path: impl Into<PathBuf>, text: &str) -> Self {
        Self::with_bytes(path, text.as_bytes().to_vec())
    }

    pub fn with_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            reference: FileReference::new(path),
            state: Arc::new(Mutex::new(MemoryFileState {
                contents: Some(bytes),
                ..Default::default()
            })),
            waiting_commits: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryFileState> {
        self.state.lock().unwrap()
    }

    /// Starts with `mode` already granted.
    pub fn granting(self, mode: AccessMode) -> Self {
        self.state().granted = Some(mode);
        self
    }

    /// Starts with prompts for `mode` answered `yes`/no.
    pub fn answering(self, mode: AccessMode, yes: bool) -> Self {
        self.answer(mode, yes);
        self
    }

    pub fn answer(&self, mode: AccessMode, yes: bool) {
        self.state().answers.insert(mode, yes);
    }

    /// Drops every grant, as if the user revoked access outside the app.
    pub fn revoke(&self) {
        self.state().granted = None;
    }

    /// Deletes the file.
    pub fn remove(&self) {
        self.state().contents = None;
    }

    pub fn fail_next_write(&self) {
        self.state().failing_writes += 1;
    }

    /// Makes commits wait until [`MemoryFile::release_commits`].
    pub fn hold_commits(&self) {
        self.state().commit_gate = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_commits(&self) {
        if let Some(gate) = self.state().commit_gate.take() {
            gate.add_permits(1024);
        }
    }

    /// Number of commits currently held.
    pub fn waiting_commits(&self) -> usize {
        self.waiting_commits.load(Ordering::SeqCst)
    }

    pub fn text(&self) -> String {
        self.state()
            .contents
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    pub fn prompt_count(&self) -> usize {
        self.state().prompts
    }

    fn missing(&self) -> ScribeError {
        ScribeError::unavailable(format!("{} no longer exists", self.reference))
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn reference(&self) -> &FileReference {
        &self.reference
    }

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        let state = self.state();
        if state.contents.is_none() {
            return Err(self.missing());
        }
        Ok(match state.granted {
            Some(granted) if granted.covers(mode) => PermissionState::Granted,
            _ => PermissionState::Prompt,
        })
    }

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        let mut state = self.state();
        state.prompts += 1;
        if state.contents.is_none() {
            return Err(self.missing());
        }
        if state.answers.get(&mode).copied().unwrap_or(false) {
            if !state.granted.is_some_and(|granted| granted.covers(mode)) {
                state.granted = Some(mode);
            }
            Ok(PermissionState::Granted)
        } else {
            Ok(PermissionState::Denied)
        }
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        self.state().contents.clone().ok_or_else(|| self.missing())
    }

    async fn create_writable(&self) -> Result<Box<dyn WritableFile>> {
        if self.state().contents.is_none() {
            return Err(self.missing());
        }
        Ok(Box::new(MemoryWritable {
            state: self.state.clone(),
            waiting_commits: self.waiting_commits.clone(),
            buffer: Vec::new(),
        }))
    }
}

struct MemoryWritable {
    state: Arc<Mutex<MemoryFileState>>,
    waiting_commits: Arc<AtomicUsize>,
    buffer: Vec<u8>,
}

#[async_trait]
impl WritableFile for MemoryWritable {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryWritable {
            state,
            waiting_commits,
            buffer,
        } = *self;

        let gate = state.lock().unwrap().commit_gate.clone();
        if let Some(gate) = gate {
            waiting_commits.fetch_add(1, Ordering::SeqCst);
            let permit = gate.acquire().await;
            waiting_commits.fetch_sub(1, Ordering::SeqCst);
            permit.map_err(|e| ScribeError::internal(e.to_string()))?.forget();
        }

        let mut state = state.lock().unwrap();
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(ScribeError::io("simulated write failure"));
        }
        state.contents = Some(buffer);
        state.writes += 1;
        Ok(())
    }
}

/// Host resolving references to registered [`MemoryFile`]s.
///
/// Unknown references resolve to a file that does not exist.
#[derive(Default)]
pub struct MemoryHost {
    files: Mutex<HashMap<FileReference, Arc<MemoryFile>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, file: Arc<MemoryFile>) {
        self.files
            .lock()
            .unwrap()
            .insert(file.reference().clone(), file);
    }
}

impl FileHost for MemoryHost {
    fn handle(&self, reference: &FileReference) -> Arc<dyn FileHandle> {
        if let Some(file) = self.files.lock().unwrap().get(reference) {
            return file.clone();
        }
        let missing = MemoryFile::with_bytes(reference.location(), Vec::new());
        missing.remove();
        Arc::new(missing)
    }
}

/// Picker returning a fixed answer; `None` means the user cancelled.
pub struct MemoryPicker {
    answer: Option<FileReference>,
}

impl MemoryPicker {
    pub fn returning(answer: Option<FileReference>) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl FilePicker for MemoryPicker {
    async fn pick(&self) -> Result<Option<FileReference>> {
        Ok(self.answer.clone())
    }
}

/// Recent-files repository with switchable failures.
#[derive(Default)]
pub struct MemoryRecentRepository {
    list: Mutex<RecentList>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
    puts: AtomicUsize,
}

impl MemoryRecentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn names(&self) -> Vec<String> {
        self.list.lock().unwrap().names()
    }
}

#[async_trait]
impl RecentFilesRepository for MemoryRecentRepository {
    async fn get(&self) -> Result<RecentList> {
        if *self.fail_reads.lock().unwrap() {
            return Err(ScribeError::storage("simulated read failure"));
        }
        Ok(self.list.lock().unwrap().clone())
    }

    async fn put(&self, list: &RecentList) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ScribeError::storage("simulated write failure"));
        }
        *self.list.lock().unwrap() = list.clone();
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//! Best-effort persistence of the history cache.
//!
//! The cache is serialized as a bare JSON array of records,
//! most-recent-first; the array shape and the icon strings are a stable
//! format. The in-memory cache is always the source of truth; the store is
//! only a cold-start seed, which is why every failure path below recovers
//! locally instead of surfacing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::types::HistoryRecord;

/// External blob store: read/write a named resource.
pub trait BlobStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    /// Read the resource; fails if absent.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Filesystem-backed blob store. Writes are atomic: temp file then rename.
#[derive(Debug, Default)]
pub struct FsBlobStore;

impl BlobStore for FsBlobStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Pending-write slot shared with the writer thread. Holding at most one
/// payload realizes the save semantics: under rapid successive saves the
/// store converges on the last save that completes.
struct WriterSlot {
    state: Mutex<SlotState>,
    cv: Condvar,
}

struct SlotState {
    pending: Option<Vec<u8>>,
    closed: bool,
}

/// Load/save of the history cache against a [`BlobStore`].
///
/// `save` is fire-and-forget: the payload is handed to a background writer
/// and the caller never observes completion or failure. Dropping the adapter
/// flushes the pending slot and joins the writer.
pub struct HistoryPersistence {
    store: Arc<dyn BlobStore>,
    path: PathBuf,
    slot: Arc<WriterSlot>,
    writer: Option<JoinHandle<()>>,
}

impl HistoryPersistence {
    pub fn new(store: Arc<dyn BlobStore>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slot = Arc::new(WriterSlot {
            state: Mutex::new(SlotState {
                pending: None,
                closed: false,
            }),
            cv: Condvar::new(),
        });

        let writer = {
            let store = Arc::clone(&store);
            let path = path.clone();
            let slot = Arc::clone(&slot);
            thread::spawn(move || writer_loop(&*store, &path, &slot))
        };

        Self {
            store,
            path,
            slot,
            writer: Some(writer),
        }
    }

    /// Filesystem persistence at the given path.
    pub fn on_disk(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsBlobStore), path)
    }

    /// Read the persisted records, most-recent-first.
    ///
    /// An absent resource is a normal cold start, not an error. An existing
    /// but unparsable resource is logged and treated as absent: the engine
    /// proceeds with a cold cache rather than failing startup.
    pub fn load(&self) -> Vec<HistoryRecord> {
        if !self.store.exists(&self.path) {
            debug!(path = %self.path.display(), "no persisted history, starting cold");
            return Vec::new();
        }
        let bytes = match self.store.read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unable to read history, starting cold");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unable to parse history, starting cold");
                Vec::new()
            }
        }
    }

    /// Serialize the full sequence and write it asynchronously.
    ///
    /// The result channel is deliberately discarded: failures are logged by
    /// the writer, never retried, never surfaced.
    pub fn save(&self, records: &[HistoryRecord]) {
        let bytes = match serde_json::to_vec(records) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "unable to serialize history, save dropped");
                return;
            }
        };
        let mut state = self.slot.state.lock().expect("writer slot poisoned");
        state.pending = Some(bytes);
        drop(state);
        self.slot.cv.notify_one();
    }
}

impl Drop for HistoryPersistence {
    fn drop(&mut self) {
        {
            let mut state = self.slot.state.lock().expect("writer slot poisoned");
            state.closed = true;
        }
        self.slot.cv.notify_one();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}

fn writer_loop(store: &dyn BlobStore, path: &Path, slot: &WriterSlot) {
    loop {
        let payload = {
            let mut state = slot.state.lock().expect("writer slot poisoned");
            while state.pending.is_none() && !state.closed {
                state = slot.cv.wait(state).expect("writer slot poisoned");
            }
            match state.pending.take() {
                Some(payload) => payload,
                // Closed with nothing pending: done.
                None => return,
            }
        };
        if let Err(e) = store.write(path, &payload) {
            warn!(path = %path.display(), error = %e, "history save failed, dropped");
        }
    }
}

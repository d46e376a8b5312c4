//! # Ledger Stores
//!
//! A store holds two named regions, `counter` and `records`, and persists
//! them together: [`Store::commit`] either writes both or neither.
//!
//! ## File Layout (v1)
//!
//! ```text
//! {
//!   "version": 1,
//!   "counter": 3,
//!   "records": [ {...}, {...}, {...} ]
//! }
//! ```
//!
//! A missing file is the initial state (counter 0, no records). Commits are
//! written to a uniquely named `<file>.<uuid>.tmp`, fsynced and renamed over
//! the original, so a crash leaves either the old or the new document on
//! disk.
//!
//! ## Sharing
//!
//! [`FileStore::shared`] hands out one `Arc<Mutex<FileStore>>` per resolved
//! path, so every ledger opened on the same file in this process takes the
//! same lock from load through commit.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReciboError;
use crate::model::ReceiptRecord;

/// The only store format this crate reads or writes.
pub const FORMAT_VERSION: u32 = 1;

/// Contents of both store regions at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub counter: u64,
    pub records: Vec<ReceiptRecord>,
}

impl Snapshot {
    /// Counter value that accounts for every issued number.
    ///
    /// Never lower than the sequence of the newest stored record, even if
    /// the `counter` region was lost or edited by hand.
    fn reconciled(mut self) -> Self {
        let highest = self
            .records
            .iter()
            .map(|r| r.operation_number.sequence())
            .max()
            .unwrap_or(0);
        self.counter = self.counter.max(highest);
        self
    }
}

/// Persistence backend for [`OperationLedger`](super::OperationLedger).
pub trait Store: Send {
    /// Read both regions.
    fn load(&self) -> Result<Snapshot, ReciboError>;

    /// Replace both regions in one atomic step.
    fn commit(&mut self, snapshot: &Snapshot) -> Result<(), ReciboError>;
}

// ============================================================================
// FILE STORE
// ============================================================================

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    counter: u64,
    records: &'a [ReceiptRecord],
}

#[derive(Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    counter: u64,
    #[serde(default)]
    records: Vec<ReceiptRecord>,
}

/// File stores currently open in this process, by resolved path.
static OPEN_STORES: Lazy<DashMap<PathBuf, Weak<Mutex<FileStore>>>> = Lazy::new(DashMap::new);

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The process-wide handle for the store at `path`.
    ///
    /// Paths that resolve to the same file (relative, absolute, through a
    /// symlinked directory) share one handle while any of them is alive.
    pub fn shared<P: AsRef<Path>>(path: P) -> Arc<Mutex<FileStore>> {
        let path = path.as_ref();
        let mut slot = OPEN_STORES.entry(resolve(path)).or_default();
        if let Some(store) = slot.upgrade() {
            return store;
        }
        let store = Arc::new(Mutex::new(FileStore::new(path)));
        *slot = Arc::downgrade(&store);
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn write_temp(&self, temp: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(temp)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

/// Absolute, symlink-free form of `path`, also for files not created yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Snapshot, ReciboError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => {
                return Err(ReciboError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let doc: Document = serde_json::from_slice(&bytes).map_err(|e| {
            ReciboError::Persistence(format!("Corrupt store {}: {}", self.path.display(), e))
        })?;

        if doc.version != FORMAT_VERSION {
            return Err(ReciboError::Persistence(format!(
                "Unsupported store version {} in {} (expected {})",
                doc.version,
                self.path.display(),
                FORMAT_VERSION
            )));
        }

        Ok(Snapshot {
            counter: doc.counter,
            records: doc.records,
        }
        .reconciled())
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<(), ReciboError> {
        let bytes = serde_json::to_vec_pretty(&DocumentRef {
            version: FORMAT_VERSION,
            counter: snapshot.counter,
            records: &snapshot.records,
        })
        .map_err(|e| ReciboError::Persistence(format!("Failed to encode store: {}", e)))?;

        let temp = self.temp_path();
        let result = self
            .write_temp(&temp, &bytes)
            .and_then(|()| fs::rename(&temp, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&temp);
            return Err(ReciboError::Persistence(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            )));
        }

        tracing::debug!(
            path = %self.path.display(),
            counter = snapshot.counter,
            records = snapshot.records.len(),
            "Store committed"
        );
        Ok(())
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Snapshot,
    unavailable: bool,
}

/// In-process store. Clones share the same contents.
///
/// [`MemoryStore::set_available`] simulates the backing store going away,
/// after which every load and commit fails with a persistence error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.unavailable = !available;
        }
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemoryInner) -> T) -> Result<T, ReciboError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ReciboError::Persistence("Memory store lock poisoned".to_string()))?;
        if inner.unavailable {
            return Err(ReciboError::Persistence(
                "Memory store unavailable".to_string(),
            ));
        }
        Ok(f(&mut inner))
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot, ReciboError> {
        self.with_inner(|inner| inner.snapshot.clone())
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<(), ReciboError> {
        self.with_inner(|inner| inner.snapshot = snapshot.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

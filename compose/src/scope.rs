//! Per-job resource scope.
//!
//! Every resource a job acquires (decoded buffers, intermediate mixes, temp
//! files) is registered in the job's [`Scope`]. Guards release their entry
//! when dropped; [`Scope::close`] releases whatever is still live. Release is
//! best-effort: a failing entry is logged and reported, and the remaining
//! entries are still released.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

type ReleaseFn = Box<dyn FnOnce() -> io::Result<()> + Send>;

/// Kind of a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A decoded or intermediate in-memory buffer.
    Buffer,
    /// A file under the job's work directory.
    TempFile,
    /// Anything registered through [`Scope::register`].
    Other,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Buffer => write!(f, "buffer"),
            ResourceKind::TempFile => write!(f, "temp_file"),
            ResourceKind::Other => write!(f, "other"),
        }
    }
}

struct Entry {
    kind: ResourceKind,
    label: String,
    release: Option<ReleaseFn>,
}

#[derive(Default)]
struct Ledger {
    next_id: AtomicU64,
    entries: Mutex<BTreeMap<u64, Entry>>,
}

impl Ledger {
    fn insert(&self, kind: ResourceKind, label: String, release: Option<ReleaseFn>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().insert(
            id,
            Entry {
                kind,
                label,
                release,
            },
        );
        id
    }

    fn take(&self, id: u64) -> Option<Entry> {
        self.entries.lock().remove(&id)
    }

    fn release(&self, id: u64) -> Option<ReleaseFailure> {
        // The lock is not held while the release callback runs.
        let entry = self.take(id)?;
        run_release(entry)
    }

    fn drain(&self) -> Vec<Entry> {
        let mut entries = self.entries.lock();
        std::mem::take(&mut *entries).into_values().rev().collect()
    }
}

fn run_release(entry: Entry) -> Option<ReleaseFailure> {
    let Entry {
        kind,
        label,
        release,
    } = entry;
    let release = release?;
    match release() {
        Ok(()) => None,
        Err(error) => {
            warn!("failed to release {} {}: {}", kind, label, error);
            Some(ReleaseFailure { label, error })
        }
    }
}

/// A release that did not succeed.
#[derive(Debug)]
pub struct ReleaseFailure {
    pub label: String,
    pub error: io::Error,
}

/// Outcome of [`Scope::close`].
#[derive(Debug, Default)]
pub struct ReleaseReport {
    /// Entries released by the close call itself.
    pub released: usize,
    pub failures: Vec<ReleaseFailure>,
}

impl ReleaseReport {
    /// Returns true if every release succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Registration handle for one scope entry.
///
/// Dropping the lease releases the entry.
pub struct Lease {
    ledger: Arc<Ledger>,
    id: Option<u64>,
}

impl Lease {
    /// Releases the entry now and reports a failure, if any.
    pub fn release(mut self) -> Option<ReleaseFailure> {
        let id = self.id.take()?;
        self.ledger.release(id)
    }

    /// Removes the entry from the scope without running its release action.
    pub fn detach(mut self) {
        if let Some(id) = self.id.take() {
            self.ledger.take(id);
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            // Failures are already logged by the ledger.
            let _ = self.ledger.release(id);
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease").field("id", &self.id).finish()
    }
}

/// A value whose lifetime is recorded in a scope.
#[derive(Debug)]
pub struct Tracked<T> {
    value: T,
    lease: Lease,
}

impl<T> Tracked<T> {
    /// Unregisters the value and returns it.
    pub fn into_inner(self) -> T {
        let Tracked { value, lease } = self;
        lease.detach();
        value
    }

    /// Splits into the value and its lease.
    pub fn into_parts(self) -> (T, Lease) {
        (self.value, self.lease)
    }

    /// Reassembles a value with a lease.
    pub fn from_parts(value: T, lease: Lease) -> Self {
        Self { value, lease }
    }

    /// Transforms the value, keeping the same scope entry.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tracked<U> {
        Tracked {
            value: f(self.value),
            lease: self.lease,
        }
    }

    /// Fallible [`Tracked::map`]. On error the entry is released.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Tracked<U>, E> {
        let value = f(self.value)?;
        Ok(Tracked {
            value,
            lease: self.lease,
        })
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// A file under the job's work directory, removed on release.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    lease: Lease,
}

impl TempArtifact {
    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now.
    pub fn release(self) -> Option<ReleaseFailure> {
        self.lease.release()
    }
}

fn remove_file(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Snapshot of a live scope entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEntry {
    pub kind: ResourceKind,
    pub label: String,
}

/// Resource scope of one compose job.
///
/// Owns a private work directory which is removed when the scope closes.
pub struct Scope {
    job_id: Uuid,
    ledger: Arc<Ledger>,
    work_dir: Option<TempDir>,
    work_path: PathBuf,
    closed: bool,
}

impl Scope {
    /// Opens a scope with a fresh job id and a work directory under `work_root`.
    pub fn new(work_root: &Path) -> io::Result<Self> {
        let job_id = Uuid::new_v4();
        std::fs::create_dir_all(work_root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("mixdown-{}-", job_id))
            .tempdir_in(work_root)?;
        let work_path = dir.path().to_path_buf();
        debug!("job {} work dir {}", job_id, work_path.display());
        Ok(Self {
            job_id,
            ledger: Arc::new(Ledger::default()),
            work_dir: Some(dir),
            work_path,
            closed: false,
        })
    }

    /// Returns the job id.
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Returns the job's private work directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_path
    }

    /// Registers a resource with a release action.
    pub fn register<F>(&self, kind: ResourceKind, label: impl Into<String>, release: F) -> Lease
    where
        F: FnOnce() -> io::Result<()> + Send + 'static,
    {
        let id = self.ledger.insert(kind, label.into(), Some(Box::new(release)));
        self.lease(id)
    }

    /// Records an in-memory value. The value is freed when the guard drops.
    pub fn track<T>(&self, label: impl Into<String>, value: T) -> Tracked<T> {
        let id = self.ledger.insert(ResourceKind::Buffer, label.into(), None);
        Tracked {
            value,
            lease: self.lease(id),
        }
    }

    /// Reserves a uniquely named file path in the work directory.
    ///
    /// The file is not created; it is removed on release if it exists.
    pub fn temp_file(&self, extension: &str) -> TempArtifact {
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.work_path.join(name);
        let target = path.clone();
        let lease = self.register(ResourceKind::TempFile, path.display().to_string(), move || {
            remove_file(&target)
        });
        TempArtifact { path, lease }
    }

    /// Moves a temp file out of the scope to `dest_dir/file_name`.
    ///
    /// The moved file is no longer released by the scope.
    pub fn promote(
        &self,
        artifact: TempArtifact,
        dest_dir: &Path,
        file_name: &str,
    ) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(file_name);
        if std::fs::rename(&artifact.path, &dest).is_err() {
            // Cross-device moves fall back to copy and remove.
            std::fs::copy(&artifact.path, &dest)?;
            remove_file(&artifact.path)?;
        }
        artifact.lease.detach();
        Ok(dest)
    }

    /// Number of entries not yet released.
    pub fn live(&self) -> usize {
        self.ledger.entries.lock().len()
    }

    /// Snapshot of the entries not yet released.
    pub fn live_entries(&self) -> Vec<LiveEntry> {
        self.ledger
            .entries
            .lock()
            .values()
            .map(|e| LiveEntry {
                kind: e.kind,
                label: e.label.clone(),
            })
            .collect()
    }

    /// Releases every remaining entry, newest first, then removes the work
    /// directory.
    pub fn close(&mut self) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        if self.closed {
            return report;
        }
        self.closed = true;

        for entry in self.ledger.drain() {
            report.released += 1;
            if let Some(failure) = run_release(entry) {
                report.failures.push(failure);
            }
        }

        if let Some(dir) = self.work_dir.take() {
            if let Err(error) = dir.close() {
                warn!(
                    "failed to remove work dir {}: {}",
                    self.work_path.display(),
                    error
                );
                report.failures.push(ReleaseFailure {
                    label: self.work_path.display().to_string(),
                    error,
                });
            }
        }
        report
    }

    fn lease(&self, id: u64) -> Lease {
        Lease {
            ledger: Arc::clone(&self.ledger),
            id: Some(id),
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("job_id", &self.job_id)
            .field("work_dir", &self.work_path)
            .field("live", &self.live())
            .finish()
    }
}

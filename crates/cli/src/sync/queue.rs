// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue for operations that could not be submitted.
//!
//! Uses JSONL format for durability - each operation is written as a single
//! line and fsynced before `enqueue` returns. Removal rewrites the file
//! through a temporary file and a rename, then fsyncs the directory, so a
//! crash leaves either the old or the new contents, never a mix.
//!
//! Lines that cannot be decoded are skipped when listing but are never
//! dropped by a rewrite: only the line holding the removed id goes away.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use invsync_core::{OpId, QueuedOperation};
use serde_json::Value;

use crate::hub::{ListenerHandle, Listeners};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Durable backing storage for the queue.
///
/// Implementations hold no cache: `load` always reflects what is stored.
pub trait QueueStore: Send + Sync {
    /// Read every stored operation, oldest first.
    fn load(&self) -> QueueResult<Vec<QueuedOperation>>;

    /// Durably append one operation.
    fn append(&self, op: &QueuedOperation) -> QueueResult<()>;

    /// Durably delete the operation with `id`, leaving everything else
    /// untouched. Returns `false` if nothing was stored under `id`.
    fn remove(&self, id: &OpId) -> QueueResult<bool>;
}

/// JSONL file store, one operation per line.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Open the store at `path`, creating the file and its parent directory.
    pub fn open(path: &Path) -> QueueResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let created = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        if created {
            file.sync_all()?;
            sync_parent_dir(path)?;
        }
        terminate_last_line(&mut file)?;

        Ok(JsonlStore {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl QueueStore for JsonlStore {
    fn load(&self) -> QueueResult<Vec<QueuedOperation>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut ops = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<QueuedOperation>(&line) {
                Ok(op) => ops.push(op),
                // Left on disk; `remove` writes it back unchanged.
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping unreadable queue entry"
                ),
            }
        }

        Ok(ops)
    }

    fn append(&self, op: &QueuedOperation) -> QueueResult<()> {
        let json = serde_json::to_string(op)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;
        Ok(())
    }

    fn remove(&self, id: &OpId) -> QueueResult<bool> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut found = false;
        let kept: Vec<&str> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| {
                let matches = serde_json::from_str::<QueuedOperation>(line)
                    .is_ok_and(|op| &op.id == id);
                found |= matches;
                !matches
            })
            .collect();
        if !found {
            return Ok(false);
        }

        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            for line in kept {
                writeln!(file, "{}", line)?;
            }
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        sync_parent_dir(&self.path)?;
        Ok(true)
    }
}

/// Make a create or rename of `path` durable by syncing its directory.
#[cfg(unix)]
pub(crate) fn sync_parent_dir(path: &Path) -> QueueResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_parent_dir(_path: &Path) -> QueueResult<()> {
    Ok(())
}

/// Make sure the next append starts on a fresh line after a torn write.
fn terminate_last_line(file: &mut File) -> QueueResult<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        writeln!(file)?;
        file.sync_all()?;
    }
    Ok(())
}

/// Volatile store for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ops: Mutex<Vec<QueuedOperation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ops(&self) -> MutexGuard<'_, Vec<QueuedOperation>> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueueStore for MemoryStore {
    fn load(&self) -> QueueResult<Vec<QueuedOperation>> {
        Ok(self.ops().clone())
    }

    fn append(&self, op: &QueuedOperation) -> QueueResult<()> {
        self.ops().push(op.clone());
        Ok(())
    }

    fn remove(&self, id: &OpId) -> QueueResult<bool> {
        let mut ops = self.ops();
        let before = ops.len();
        ops.retain(|op| &op.id != id);
        Ok(ops.len() != before)
    }
}

/// FIFO queue of pending operations over a [`QueueStore`].
///
/// Mutations are serialized by an internal lock, so concurrent enqueue and
/// remove calls never lose each other's writes.
pub struct OfflineQueue {
    store: Box<dyn QueueStore>,
    write_lock: Mutex<()>,
    listeners: Listeners<usize>,
}

impl OfflineQueue {
    /// Create or open a file-backed queue at the given path.
    pub fn open(path: &Path) -> QueueResult<Self> {
        Ok(Self::with_store(JsonlStore::open(path)?))
    }

    /// Create a queue that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: impl QueueStore + 'static) -> Self {
        OfflineQueue {
            store: Box::new(store),
            write_lock: Mutex::new(()),
            listeners: Listeners::new("queue change"),
        }
    }

    /// Register a listener called with the pending count after every change.
    pub fn on_change<F>(&self, listener: F) -> ListenerHandle<usize>
    where
        F: Fn(&usize) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    /// Persist `payload` as a new operation and return its id.
    ///
    /// Returns only after the write is durable.
    pub fn enqueue(&self, payload: Value) -> QueueResult<OpId> {
        self.enqueue_op(QueuedOperation::new(payload))
    }

    /// Persist `op` unless an operation with the same id is already stored.
    pub fn enqueue_op(&self, op: QueuedOperation) -> QueueResult<OpId> {
        let count = {
            let _guard = self.write();
            let mut ops = self.store.load()?;
            if ops.iter().any(|existing| existing.id == op.id) {
                tracing::debug!(id = %op.id, "operation already queued");
                return Ok(op.id);
            }
            self.store.append(&op).inspect_err(|e| {
                tracing::error!(id = %op.id, error = %e, "failed to persist queued operation");
            })?;
            ops.push(op.clone());
            ops.len()
        };
        tracing::debug!(id = %op.id, pending = count, "operation queued");
        self.listeners.notify(&count);
        Ok(op.id)
    }

    /// All pending operations, oldest first, read from storage.
    pub fn list(&self) -> QueueResult<Vec<QueuedOperation>> {
        self.store.load()
    }

    /// Delete the operation with `id`. Returns `false` if it was absent.
    pub fn remove(&self, id: &OpId) -> QueueResult<bool> {
        let count = {
            let _guard = self.write();
            let removed = self.store.remove(id).inspect_err(|e| {
                tracing::error!(id = %id, error = %e, "failed to remove queued operation");
            })?;
            if !removed {
                return Ok(false);
            }
            self.store.load()?.len()
        };
        tracing::debug!(id = %id, pending = count, "operation removed");
        self.listeners.notify(&count);
        Ok(true)
    }

    /// Get the number of pending operations.
    pub fn count(&self) -> QueueResult<usize> {
        Ok(self.store.load()?.len())
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.count()? == 0)
    }

    fn write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! JSON-file persistence for waypoint groups.
//!
//! Groups live in an insertion-ordered map keyed by lowercase name (lookups
//! are case-insensitive) and are mirrored to a single pretty-printed JSON
//! document. Saves are dirty-flag gated and go through a temp file followed
//! by a rename, so the on-disk file is never left truncated: on any I/O
//! failure the temp file is discarded, the previous file survives and the
//! dirty flag stays set for a later retry.

use crate::types::WaypointGroup;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("waypoint file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("waypoint file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent, lock-per-call store of waypoint groups.
pub struct WaypointStore {
    groups: Mutex<IndexMap<String, WaypointGroup>>,
    dirty: AtomicBool,
    path: PathBuf,
}

impl WaypointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            groups: Mutex::new(IndexMap::new()),
            dirty: AtomicBool::new(false),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Read the backing file into memory. A missing file is not an error.
    ///
    /// The document is parsed in full before the in-memory map is touched,
    /// so a corrupt file leaves the map at its prior state. Keys are
    /// re-lowercased and a group with a missing name takes its map key.
    pub fn load(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let text = fs::read_to_string(&self.path)?;
        let parsed: IndexMap<String, WaypointGroup> = serde_json::from_str(&text)?;

        let mut groups = self.groups.lock();
        groups.clear();
        for (key, mut group) in parsed {
            if group.name.is_empty() {
                group.name = key.clone();
            }
            groups.insert(key.to_lowercase(), group);
        }
        let count = groups.len();
        drop(groups);

        self.dirty.store(false, Ordering::SeqCst);
        log::debug!("loaded {} waypoint groups from {}", count, self.path.display());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Ordered snapshot of all groups, safe to iterate while the live map
    /// is mutated.
    pub fn groups(&self) -> IndexMap<String, WaypointGroup> {
        self.groups.lock().clone()
    }

    /// Case-insensitive lookup; returns a clone of the stored group.
    pub fn group(&self, name: &str) -> Option<WaypointGroup> {
        self.groups.lock().get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.lock().is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Upsert, keyed by the group's own name lowercased. A group with an
    /// empty name is ignored.
    pub fn put_group(&self, group: WaypointGroup) {
        if group.name.is_empty() {
            return;
        }
        self.groups.lock().insert(group.key(), group);
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn remove_group(&self, name: &str) -> bool {
        let removed = self
            .groups
            .lock()
            .shift_remove(&name.to_lowercase())
            .is_some();
        if removed {
            self.dirty.store(true, Ordering::SeqCst);
        }
        removed
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    pub fn save_if_dirty(&self) -> Result<(), StorageError> {
        if !self.dirty.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.save_force()
    }

    /// Serialize every group and atomically replace the backing file.
    pub fn save_force(&self) -> Result<(), StorageError> {
        let json = {
            let groups = self.groups.lock();
            serde_json::to_string_pretty(&*groups)?
        };

        let tmp = tmp_path(&self.path);
        match write_and_swap(&tmp, &self.path, &json) {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                log::debug!("saved waypoint groups to {}", self.path.display());
                Ok(())
            }
            Err(e) => {
                // Previous file is untouched; leave dirty set for a retry.
                let _ = fs::remove_file(&tmp);
                Err(e.into())
            }
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_and_swap(tmp: &Path, target: &Path, json: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(tmp, json)?;
    if fs::rename(tmp, target).is_err() {
        // Exotic filesystems without an atomic rename: plain replace.
        fs::copy(tmp, target)?;
        let _ = fs::remove_file(tmp);
    }
    Ok(())
}

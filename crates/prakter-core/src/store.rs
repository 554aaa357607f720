//! File-backed store for the three project files.
//!
//! There is no in-memory cache: every load re-parses the file and every save
//! rewrites the whole collection. Successful writes are announced to
//! subscribers so trees and panels can re-render.

use crate::changelog::ChangelogItem;
use crate::error::{PrakterError, Result};
use crate::io;
use crate::paths;
use crate::todo::TodoItem;
use crate::types::FileKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

// ---------------------------------------------------------------------------
// StoreEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreEvent {
    TodosChanged,
    ChangelogChanged,
    ReadmeChanged,
    /// Explicit re-render request; no file changed.
    Refresh,
}

impl StoreEvent {
    pub fn for_kind(kind: FileKind) -> Self {
        match kind {
            FileKind::Readme => StoreEvent::ReadmeChanged,
            FileKind::Changelog => StoreEvent::ChangelogChanged,
            FileKind::Todo => StoreEvent::TodosChanged,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreEvent::TodosChanged => "todos_changed",
            StoreEvent::ChangelogChanged => "changelog_changed",
            StoreEvent::ReadmeChanged => "readme_changed",
            StoreEvent::Refresh => "refresh",
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

type Listener = Arc<dyn Fn(StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle returned by [`Store::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Access to README.md, CHANGELOG.json and TODO.json under one workspace root.
///
/// Clones share the same subscriber list.
#[derive(Clone)]
pub struct Store {
    root: PathBuf,
    listeners: Arc<Mutex<Listeners>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("root", &self.root).finish()
    }
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Like `new`, but fails with `MissingWorkspace` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        paths::require_workspace(&root)?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, kind: FileKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    pub fn exists(&self, kind: FileKind) -> bool {
        self.path(kind).exists()
    }

    // -----------------------------------------------------------------------
    // TODO.json
    // -----------------------------------------------------------------------

    pub fn load_todos(&self) -> Result<Vec<TodoItem>> {
        load_array(&paths::todo_path(&self.root))
    }

    pub fn save_todos(&self, todos: &[TodoItem]) -> Result<()> {
        self.write(FileKind::Todo, io::to_pretty_json(todos)?.as_bytes())?;
        tracing::debug!(count = todos.len(), "saved TODO.json");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // CHANGELOG.json
    // -----------------------------------------------------------------------

    pub fn load_changelog(&self) -> Result<Vec<ChangelogItem>> {
        load_array(&paths::changelog_path(&self.root))
    }

    pub fn save_changelog(&self, changelog: &[ChangelogItem]) -> Result<()> {
        self.write(FileKind::Changelog, io::to_pretty_json(changelog)?.as_bytes())?;
        tracing::debug!(count = changelog.len(), "saved CHANGELOG.json");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // README.md
    // -----------------------------------------------------------------------

    pub fn load_readme(&self) -> Result<Option<String>> {
        let path = paths::readme_path(&self.root);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to read README.md");
        })?;
        Ok(Some(text))
    }

    pub fn save_readme(&self, content: &str) -> Result<()> {
        self.write(FileKind::Readme, content.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Raw writes and notification
    // -----------------------------------------------------------------------

    /// Overwrite the file for `kind` with `data` and notify subscribers.
    pub fn write(&self, kind: FileKind, data: &[u8]) -> Result<()> {
        let path = self.path(kind);
        io::atomic_write(&path, data).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "write failed");
        })?;
        self.emit(StoreEvent::for_kind(kind));
        Ok(())
    }

    /// Ask every view to re-render without touching any file.
    pub fn refresh(&self) {
        self.emit(StoreEvent::Refresh);
    }

    /// Register `listener` for store events until the returned handle drops.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(StoreEvent) + Send + Sync + 'static,
    {
        let mut guard = lock(&self.listeners);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    fn emit(&self, event: StoreEvent) {
        // Snapshot first so listeners may subscribe or unsubscribe re-entrantly.
        let snapshot: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

/// Read a JSON array file. Absent file → empty vec; invalid JSON → `Parse`.
fn load_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path).inspect_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "read failed");
    })?;
    let items: Vec<T> = serde_json::from_str(&data).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "invalid JSON");
        PrakterError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(path = %path.display(), count = items.len(), "loaded");
    Ok(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

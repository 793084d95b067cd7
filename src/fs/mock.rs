// src/fs/mock.rs

use super::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    read_only: HashSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Clones share state, so a test can keep a handle while a `RecordStore`
/// owns another one.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        insert_file(&mut state.entries, path.as_ref(), content.into());
    }

    /// Create an empty directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Make every later `write` to `path` fail with `PermissionDenied`.
    pub fn set_read_only(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        state.read_only.insert(path.as_ref().to_path_buf());
    }

    /// Raw bytes of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.lock();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn insert_file(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, content: Vec<u8>) {
    entries.insert(path.to_path_buf(), MockEntry::File(content));

    // Parent directories exist implicitly in this mock.
    if let Some(parent) = path.parent() {
        let parent = normalize_parent(parent);
        ensure_dir_entry(entries, parent);
        link_child(entries, parent, path);
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        let parent = normalize_parent(parent);
        if parent != path {
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(ErrorKind::NotFound, format!("File not found: {:?}", path))
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => String::from_utf8(content.clone())
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e)),
            Some(MockEntry::Dir(_)) => Err(io::Error::other(format!(
                "Is a directory: {:?}",
                path
            ))),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        if state.read_only.contains(path) {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("Read-only file: {:?}", path),
            ));
        }
        insert_file(&mut state.entries, path, contents.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            Some(MockEntry::File(_)) => Err(io::Error::other(format!(
                "Not a directory: {:?}",
                path
            ))),
            None => Err(not_found(path)),
        }
    }
}

// src/fs/mock.rs

use super::VaultFs;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub struct MockFile {
    pub contents: Vec<u8>,
    pub modified: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<String, MockFile>,
    dirs: BTreeSet<String>,
    /// Logical clock: every write stamps the file with the next tick.
    clock: u64,
    writes: usize,
    renames: usize,
    removals: usize,
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock)
    }

    fn ensure_dir(&mut self, path: &str) {
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            self.dirs.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &str) -> bool {
        match path.rsplit_once('/') {
            Some((parent, _)) => self.dirs.contains(parent),
            None => true,
        }
    }
}

/// In-memory vault used by tests.
///
/// Unlike [`MockVaultFs::add_file`], `write` and `rename` fail when the
/// parent folder is missing, like a real file system would.
#[derive(Debug, Clone, Default)]
pub struct MockVaultFs {
    state: Arc<Mutex<MockState>>,
}

impl MockVaultFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>> {
        self.state.lock().map_err(|_| anyhow!("mock vault mutex poisoned"))
    }

    /// Seed a file, creating its parent folders implicitly.
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        if let Ok(mut state) = self.lock() {
            if let Some((parent, _)) = path.rsplit_once('/') {
                state.ensure_dir(parent);
            }
            let modified = state.tick();
            state.files.insert(
                path.to_string(),
                MockFile {
                    contents: content.into(),
                    modified,
                },
            );
        }
    }

    /// Overwrite the modification time of an existing file.
    pub fn set_modified(&self, path: &str, modified: SystemTime) {
        if let Ok(mut state) = self.lock() {
            if let Some(file) = state.files.get_mut(path) {
                file.modified = modified;
            }
        }
    }

    /// Bump a file's modification time past everything written so far.
    pub fn touch(&self, path: &str) {
        if let Ok(mut state) = self.lock() {
            let now = state.tick();
            if let Some(file) = state.files.get_mut(path) {
                file.modified = now;
            }
        }
    }

    pub fn file(&self, path: &str) -> Option<MockFile> {
        self.lock().ok()?.files.get(path).cloned()
    }

    pub fn dir_exists(&self, path: &str) -> bool {
        self.lock().map(|s| s.dirs.contains(path)).unwrap_or(false)
    }

    /// Number of successful `write` calls.
    pub fn write_count(&self) -> usize {
        self.lock().map(|s| s.writes).unwrap_or(0)
    }

    pub fn rename_count(&self) -> usize {
        self.lock().map(|s| s.renames).unwrap_or(0)
    }

    pub fn remove_count(&self) -> usize {
        self.lock().map(|s| s.removals).unwrap_or(0)
    }
}

impl VaultFs for MockVaultFs {
    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.files.keys().cloned().collect())
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        match self.lock()?.files.get(path) {
            Some(file) => Ok(file.contents.clone()),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        let mut state = self.lock()?;
        if !state.parent_exists(path) {
            return Err(anyhow!("Parent folder missing for {:?}", path));
        }
        if state.dirs.contains(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        let modified = state.tick();
        state.files.insert(
            path.to_string(),
            MockFile {
                contents: contents.to_vec(),
                modified,
            },
        );
        state.writes += 1;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.lock()
            .map(|s| path.is_empty() || s.files.contains_key(path) || s.dirs.contains(path))
            .unwrap_or(false)
    }

    fn is_file(&self, path: &str) -> bool {
        self.lock()
            .map(|s| s.files.contains_key(path))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        let mut state = self.lock()?;
        if state.files.contains_key(path) {
            return Err(anyhow!("A file exists at {:?}", path));
        }
        state.ensure_dir(path);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut state = self.lock()?;
        if !state.parent_exists(to) {
            return Err(anyhow!("Parent folder missing for {:?}", to));
        }
        let file = state
            .files
            .remove(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        state.files.insert(to.to_string(), file);
        state.renames += 1;
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        let mut state = self.lock()?;
        state
            .files
            .remove(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        state.removals += 1;
        Ok(())
    }

    fn modified(&self, path: &str) -> Result<Option<SystemTime>> {
        Ok(self.lock()?.files.get(path).map(|f| f.modified))
    }
}

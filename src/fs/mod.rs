// src/fs/mod.rs

//! Repository store abstraction.
//!
//! All paths handed to a [`VaultFs`] are *vault-relative* and use forward
//! slashes (`"Art/cat.psd"`). The empty string is the vault root.

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

pub mod mock;

/// Abstract vault storage interface.
pub trait VaultFs: Send + Sync + Debug {
    /// Every file in the vault, vault-relative.
    fn list_files(&self) -> Result<Vec<String>>;
    fn read(&self, path: &str) -> Result<Vec<u8>>;
    /// Create or overwrite a file. The parent folder must already exist.
    fn write(&self, path: &str, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;
    /// Create a folder and its parents. Succeeds if it already exists.
    fn create_dir_all(&self, path: &str) -> Result<()>;
    fn rename(&self, from: &str, to: &str) -> Result<()>;
    fn remove_file(&self, path: &str) -> Result<()>;
    /// Modification time of a file, `None` if there is no file at `path`.
    fn modified(&self, path: &str) -> Result<Option<SystemTime>>;
}

/// Implementation backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskVaultFs {
    root: PathBuf,
}

impl DiskVaultFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files below the vault-relative folder `dir`, vault-relative and
    /// sorted. Hidden entries are skipped and symlinks are never followed.
    /// An unreadable subfolder is logged and skipped; only a failure to read
    /// `dir` itself is an error.
    pub fn list_files_under(&self, dir: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(self.abs(dir))
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(err).with_context(|| format!("reading dir {:?}", dir));
                }
                Err(err) => {
                    warn!(path = ?err.path(), error = %err, "skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }

        files.sort();
        Ok(files)
    }

    fn abs(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl VaultFs for DiskVaultFs {
    fn list_files(&self) -> Result<Vec<String>> {
        self.list_files_under("")
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(self.abs(path)).with_context(|| format!("reading file {:?}", path))
    }

    fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        fs::write(self.abs(path), contents).with_context(|| format!("writing file {:?}", path))
    }

    fn exists(&self, path: &str) -> bool {
        self.abs(path).exists()
    }

    fn is_file(&self, path: &str) -> bool {
        self.abs(path).is_file()
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        match fs::create_dir_all(self.abs(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e).with_context(|| format!("creating dir {:?}", path)),
        }
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        fs::rename(self.abs(from), self.abs(to))
            .with_context(|| format!("renaming {:?} -> {:?}", from, to))
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.abs(path)).with_context(|| format!("removing file {:?}", path))
    }

    fn modified(&self, path: &str) -> Result<Option<SystemTime>> {
        match fs::metadata(self.abs(path)) {
            Ok(meta) if meta.is_file() => Ok(Some(
                meta.modified()
                    .with_context(|| format!("reading mtime of {:?}", path))?,
            )),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading metadata of {:?}", path)),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

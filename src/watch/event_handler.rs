// src/watch/event_handler.rs

//! Translation of `notify` events into vault events.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, VaultEvent};
use crate::fs::DiskVaultFs;
use crate::watch::path_utils::{is_hidden, relative_str};

/// Stateful translator from raw `notify` events to [`RuntimeEvent`]s.
///
/// State is only needed to pair the two halves of a rename that some
/// backends report as separate `From` / `To` events.
///
/// A folder that is renamed (or moved into the vault) is reported as one
/// event per file below it, found by listing the folder's new location.
#[derive(Debug)]
pub struct EventTranslator {
    root: PathBuf,
    config_file: Option<PathBuf>,
    pending_from: Option<String>,
}

impl EventTranslator {
    pub fn new(root: impl Into<PathBuf>, config_file: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_file,
            pending_from: None,
        }
    }

    pub fn translate(&mut self, event: &Event) -> Vec<RuntimeEvent> {
        let mut out = Vec::new();

        if self.touches_config(event) {
            debug!(kind = ?event.kind, "config file changed");
            out.push(RuntimeEvent::ConfigChanged);
            return out;
        }

        let is_rename_half = matches!(
            event.kind,
            EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::From | RenameMode::Any
            ))
        );
        if !is_rename_half {
            self.flush_pending(&mut out);
        }

        match event.kind {
            EventKind::Create(CreateKind::Folder) => {}
            EventKind::Create(_) => {
                for path in self.rel_paths(event) {
                    out.push(vault(VaultEvent::Create { path }));
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to] = event.paths.as_slice() {
                    match (self.rel(from), self.rel(to)) {
                        (Some(old_path), Some(path)) => self.push_rename(&mut out, path, old_path),
                        (Some(old_path), None) => {
                            out.push(vault(VaultEvent::Delete { path: old_path }))
                        }
                        (None, Some(path)) => self.push_create(&mut out, path),
                        (None, None) => {}
                    }
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                self.flush_pending(&mut out);
                self.pending_from = self.rel_paths(event).into_iter().next();
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                for path in self.rel_paths(event) {
                    self.complete_rename(&mut out, path);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
                for path in self.rel_paths(event) {
                    if self.pending_from.is_some() {
                        self.complete_rename(&mut out, path);
                    } else {
                        self.pending_from = Some(path);
                    }
                }
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => {}
            EventKind::Modify(_) => {
                for path in self.rel_paths(event) {
                    out.push(vault(VaultEvent::Modify { path }));
                }
            }
            EventKind::Remove(RemoveKind::Folder) => {}
            EventKind::Remove(_) => {
                for path in self.rel_paths(event) {
                    out.push(vault(VaultEvent::Delete { path }));
                }
            }
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }

        out
    }

    /// An unpaired `From` half means the file left the watched tree.
    fn flush_pending(&mut self, out: &mut Vec<RuntimeEvent>) {
        if let Some(path) = self.pending_from.take() {
            out.push(vault(VaultEvent::Delete { path }));
        }
    }

    fn complete_rename(&mut self, out: &mut Vec<RuntimeEvent>, path: String) {
        match self.pending_from.take() {
            Some(old_path) => self.push_rename(out, path, old_path),
            None => self.push_create(out, path),
        }
    }

    fn push_rename(&self, out: &mut Vec<RuntimeEvent>, path: String, old_path: String) {
        let Some(files) = self.files_in_folder(&path) else {
            out.push(vault(VaultEvent::Rename { path, old_path }));
            return;
        };
        debug!(%path, %old_path, files = files.len(), "folder renamed");
        for file in files {
            let Some(below) = file.strip_prefix(&path) else {
                continue;
            };
            let old = format!("{old_path}{below}");
            out.push(vault(VaultEvent::Rename {
                path: file,
                old_path: old,
            }));
        }
    }

    fn push_create(&self, out: &mut Vec<RuntimeEvent>, path: String) {
        match self.files_in_folder(&path) {
            Some(files) => {
                for path in files {
                    out.push(vault(VaultEvent::Create { path }));
                }
            }
            None => out.push(vault(VaultEvent::Create { path })),
        }
    }

    /// Files below `path` if it is a folder now, `None` for anything else.
    fn files_in_folder(&self, path: &str) -> Option<Vec<String>> {
        let abs = self.root.join(path);
        let meta = std::fs::symlink_metadata(&abs).ok()?;
        if !meta.is_dir() {
            return None;
        }
        match DiskVaultFs::new(&self.root).list_files_under(path) {
            Ok(files) => Some(files),
            Err(err) => {
                warn!(%path, error = %err, "could not list moved folder");
                Some(Vec::new())
            }
        }
    }

    fn touches_config(&self, event: &Event) -> bool {
        let Some(cfg) = &self.config_file else {
            return false;
        };
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_)
        ) && event.paths.iter().any(|p| p == cfg)
    }

    fn rel(&self, path: &Path) -> Option<String> {
        match relative_str(&self.root, path) {
            Some(rel) if rel.is_empty() || is_hidden(&rel) => None,
            Some(rel) => Some(rel),
            None => {
                warn!(
                    "could not relativize path {:?} against root {:?}",
                    path, self.root
                );
                None
            }
        }
    }

    fn rel_paths(&self, event: &Event) -> Vec<String> {
        event.paths.iter().filter_map(|p| self.rel(p)).collect()
    }
}

fn vault(event: VaultEvent) -> RuntimeEvent {
    RuntimeEvent::Vault(event)
}

#[cfg(test)]
mod tests {
    use notify::event::{DataChange, MetadataKind};

    use super::*;

    fn ev(kind: EventKind, paths: &[&str]) -> Event {
        let mut e = Event::new(kind);
        for p in paths {
            e = e.add_path(PathBuf::from(p));
        }
        e
    }

    fn vault_events(out: Vec<RuntimeEvent>) -> Vec<VaultEvent> {
        out.into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::Vault(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    fn translator() -> EventTranslator {
        EventTranslator::new("/vault", Some(PathBuf::from("/vault/VaultExport.toml")))
    }

    #[test]
    fn create_modify_delete() {
        let mut t = translator();
        let out = t.translate(&ev(EventKind::Create(CreateKind::File), &["/vault/a.psd"]));
        assert_eq!(vault_events(out), vec![VaultEvent::Create { path: "a.psd".into() }]);

        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/vault/Art/a.psd"],
        ));
        assert_eq!(
            vault_events(out),
            vec![VaultEvent::Modify {
                path: "Art/a.psd".into()
            }]
        );

        let out = t.translate(&ev(EventKind::Remove(RemoveKind::File), &["/vault/a.psd"]));
        assert_eq!(vault_events(out), vec![VaultEvent::Delete { path: "a.psd".into() }]);
    }

    #[test]
    fn ignores_folders_metadata_and_hidden_paths() {
        let mut t = translator();
        assert!(t.translate(&ev(EventKind::Create(CreateKind::Folder), &["/vault/dir"])).is_empty());
        assert!(t
            .translate(&ev(
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
                &["/vault/a.psd"]
            ))
            .is_empty());
        assert!(t
            .translate(&ev(EventKind::Create(CreateKind::File), &["/vault/.obsidian/x.json"]))
            .is_empty());
    }

    #[test]
    fn rename_both_and_split_halves() {
        let mut t = translator();
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/vault/a.psd", "/vault/sub/b.psd"],
        ));
        assert_eq!(
            vault_events(out),
            vec![VaultEvent::Rename {
                path: "sub/b.psd".into(),
                old_path: "a.psd".into()
            }]
        );

        assert!(t
            .translate(&ev(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/vault/c.psd"]))
            .is_empty());
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/vault/d.psd"],
        ));
        assert_eq!(
            vault_events(out),
            vec![VaultEvent::Rename {
                path: "d.psd".into(),
                old_path: "c.psd".into()
            }]
        );
    }

    #[test]
    fn unpaired_from_becomes_delete() {
        let mut t = translator();
        t.translate(&ev(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/vault/c.psd"]));
        let out = t.translate(&ev(EventKind::Create(CreateKind::File), &["/vault/e.psd"]));
        assert_eq!(
            vault_events(out),
            vec![
                VaultEvent::Delete { path: "c.psd".into() },
                VaultEvent::Create { path: "e.psd".into() }
            ]
        );
    }

    /// Vault on disk with `Paint/cat.psd`, `Paint/sub/dog.psd` and a hidden
    /// `Paint/.trash/x.psd`, as left behind by renaming `Art` to `Paint`.
    fn renamed_folder_vault() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("Paint/sub")).unwrap();
        std::fs::create_dir_all(root.join("Paint/.trash")).unwrap();
        std::fs::write(root.join("Paint/cat.psd"), b"psd").unwrap();
        std::fs::write(root.join("Paint/sub/dog.psd"), b"psd").unwrap();
        std::fs::write(root.join("Paint/.trash/x.psd"), b"psd").unwrap();
        (dir, root)
    }

    fn per_file_renames() -> Vec<VaultEvent> {
        vec![
            VaultEvent::Rename {
                path: "Paint/cat.psd".into(),
                old_path: "Art/cat.psd".into(),
            },
            VaultEvent::Rename {
                path: "Paint/sub/dog.psd".into(),
                old_path: "Art/sub/dog.psd".into(),
            },
        ]
    }

    #[test]
    fn folder_rename_becomes_one_rename_per_file() {
        let (_dir, root) = renamed_folder_vault();
        let mut t = EventTranslator::new(&root, None);
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &[root.join("Art").to_str().unwrap(), root.join("Paint").to_str().unwrap()],
        ));
        assert_eq!(vault_events(out), per_file_renames());
    }

    #[test]
    fn folder_rename_in_halves_becomes_one_rename_per_file() {
        let (_dir, root) = renamed_folder_vault();
        let mut t = EventTranslator::new(&root, None);
        t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &[root.join("Art").to_str().unwrap()],
        ));
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &[root.join("Paint").to_str().unwrap()],
        ));
        assert_eq!(vault_events(out), per_file_renames());
    }

    #[test]
    fn folder_moved_into_vault_creates_its_files() {
        let (_dir, root) = renamed_folder_vault();
        let mut t = EventTranslator::new(&root, None);
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &[root.join("Paint").to_str().unwrap()],
        ));
        assert_eq!(
            vault_events(out),
            vec![
                VaultEvent::Create {
                    path: "Paint/cat.psd".into()
                },
                VaultEvent::Create {
                    path: "Paint/sub/dog.psd".into()
                },
            ]
        );
    }

    #[test]
    fn config_change_is_reported() {
        let mut t = translator();
        let out = t.translate(&ev(
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            &["/vault/VaultExport.toml"],
        ));
        assert!(matches!(out.as_slice(), [RuntimeEvent::ConfigChanged]));
    }
}

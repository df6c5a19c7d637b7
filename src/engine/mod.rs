// src/engine/mod.rs

//! Vault event orchestration.
//!
//! This module ties together:
//! - the compiled rule set (which profiles care about which file)
//! - the per-destination job queue (at most one job per artifact in flight)
//! - the main runtime event loop that reacts to:
//!   - vault create / modify / rename / delete notifications
//!   - full scans, pause / resume, config swaps
//!   - job completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::sync::Arc;

use crate::profile::compiled::{RuleSet, RuntimeExportProfile};

/// Jobs are keyed by the vault path of the artifact they produce or touch.
pub type JobKey = String;

/// A repository mutation, vault-relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Create { path: String },
    Modify { path: String },
    Rename { path: String, old_path: String },
    Delete { path: String },
}

impl VaultEvent {
    /// The path the file lives at after the event.
    pub fn path(&self) -> &str {
        match self {
            VaultEvent::Create { path }
            | VaultEvent::Modify { path }
            | VaultEvent::Rename { path, .. }
            | VaultEvent::Delete { path } => path,
        }
    }
}

/// Work item for the executor.
#[derive(Debug, Clone)]
pub struct Job {
    pub key: JobKey,
    pub kind: JobKind,
}

#[derive(Debug, Clone)]
pub enum JobKind {
    /// Render `source` with `profile` into the artifact at `key`.
    Export {
        source: String,
        profile: Arc<RuntimeExportProfile>,
        force: bool,
    },
    /// Move the artifact at `from` to `key`, if there is one. Both paths
    /// are held in the queue while it runs.
    Relocate { from: String },
    /// Remove the artifact at `key`, if there is one.
    Remove,
}

impl Job {
    pub fn label(&self) -> &'static str {
        match self.kind {
            JobKind::Export { .. } => "export",
            JobKind::Relocate { .. } => "relocate",
            JobKind::Remove => "remove",
        }
    }
}

/// How a job ended, reported back to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Exported,
    UpToDate,
    Relocated,
    Removed,
    /// Relocate/remove found no artifact.
    NothingToDo,
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once a full scan has been dispatched and
    /// every job has completed (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, executor, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A repository notification.
    Vault(VaultEvent),
    /// Walk every vault file through the matching path.
    FullScan { force: bool },
    /// Result of listing the vault for a full scan.
    VaultScanned { files: Vec<String>, force: bool },
    /// Stop reacting to vault events.
    Pause,
    /// React to vault events again.
    Resume,
    /// Swap in a freshly compiled rule set.
    ReplaceRules(Arc<RuleSet>),
    /// The config file changed on disk.
    ConfigChanged,
    /// The reload started by `ConfigChanged` is over, successful or not.
    ReloadFinished,
    /// A job finished.
    JobCompleted { key: JobKey, outcome: JobOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::{CoreRuntime, CoreState};
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::JobQueue;
pub use runtime::Runtime;

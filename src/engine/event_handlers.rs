// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, warn};

use crate::engine::queue::JobQueue;
use crate::engine::{Job, JobKey, JobKind, JobOutcome, RuntimeOptions, VaultEvent};
use crate::export::path::resolve_destination;
use crate::profile::compiled::{RuleSet, RuntimeExportProfile};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these jobs to the executor.
    Dispatch(Vec<Job>),
    /// List the vault and report back with `VaultScanned`.
    ScanVault { force: bool },
    /// Reload the config file and report back with `ReplaceRules` + `ReloadFinished`.
    ReloadConfig,
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    pub fn with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a repository notification while active.
///
/// - create / modify: export for every matching profile, non-forced.
/// - rename: relocate each matching profile's old artifact (if tracking).
/// - delete: remove each matching profile's artifact (if tracking).
pub fn handle_vault_event(rules: &RuleSet, queue: &mut JobQueue, event: VaultEvent) -> CoreStep {
    let jobs = match event {
        VaultEvent::Create { path } | VaultEvent::Modify { path } => export_jobs(rules, &path, false),
        VaultEvent::Rename { path, old_path } => {
            if !rules.track_rename() {
                debug!(%path, %old_path, "rename tracking disabled");
                Vec::new()
            } else {
                relocate_jobs(rules, &path, &old_path)
            }
        }
        VaultEvent::Delete { path } => {
            if !rules.track_delete() {
                debug!(%path, "delete tracking disabled");
                Vec::new()
            } else {
                remove_jobs(rules, &path)
            }
        }
    };

    CoreStep::with(submit_all(queue, jobs))
}

/// Handle the file listing of a full scan.
pub fn handle_vault_scanned(
    rules: &RuleSet,
    queue: &mut JobQueue,
    options: &RuntimeOptions,
    files: Vec<String>,
    force: bool,
) -> CoreStep {
    let jobs: Vec<Job> = files
        .iter()
        .flat_map(|path| export_jobs(rules, path, force))
        .collect();
    debug!(files = files.len(), jobs = jobs.len(), force, "full scan matched");

    let mut commands = submit_all(queue, jobs);
    let keep_running = !exit_if_idle(queue, options, &mut commands);
    CoreStep {
        commands,
        keep_running,
    }
}

/// Handle a job completion event.
pub fn handle_job_completion(
    queue: &mut JobQueue,
    options: &RuntimeOptions,
    key: JobKey,
    outcome: JobOutcome,
) -> CoreStep {
    if let JobOutcome::Failed(reason) = &outcome {
        warn!(%key, %reason, "job failed");
    } else {
        debug!(%key, ?outcome, "job completed");
    }

    let mut commands = Vec::new();
    let ready = queue.complete(&key);
    if !ready.is_empty() {
        commands.push(CoreCommand::Dispatch(ready));
    }

    let keep_running = !exit_if_idle(queue, options, &mut commands);
    CoreStep {
        commands,
        keep_running,
    }
}

/// Export jobs for every profile matching `path`.
pub fn export_jobs(rules: &RuleSet, path: &str, force: bool) -> Vec<Job> {
    rules
        .matching(path)
        .into_iter()
        .filter_map(|profile| {
            let key = artifact_path(&profile, path)?;
            Some(Job {
                key,
                kind: JobKind::Export {
                    source: path.to_string(),
                    profile,
                    force,
                },
            })
        })
        .collect()
}

/// Relocation jobs after `old_path` was renamed to `path`. Profiles are
/// matched against the new location. Each job is keyed by the new artifact
/// path and also holds the old one in the queue.
pub fn relocate_jobs(rules: &RuleSet, path: &str, old_path: &str) -> Vec<Job> {
    rules
        .matching(path)
        .into_iter()
        .filter_map(|profile| {
            let from = artifact_path(&profile, old_path)?;
            let to = artifact_path(&profile, path)?;
            (from != to).then(|| Job {
                key: to,
                kind: JobKind::Relocate { from },
            })
        })
        .collect()
}

/// Removal jobs for every profile matching the deleted `path`.
pub fn remove_jobs(rules: &RuleSet, path: &str) -> Vec<Job> {
    rules
        .matching(path)
        .into_iter()
        .filter_map(|profile| {
            Some(Job {
                key: artifact_path(&profile, path)?,
                kind: JobKind::Remove,
            })
        })
        .collect()
}

fn artifact_path(profile: &RuntimeExportProfile, source: &str) -> Option<String> {
    match resolve_destination(source, profile.profile(), None) {
        Ok(dst) => Some(dst.path),
        Err(e) => {
            warn!(source, profile = profile.name(), error = %e, "skipping file");
            None
        }
    }
}

fn submit_all(queue: &mut JobQueue, jobs: Vec<Job>) -> Vec<CoreCommand> {
    let ready: Vec<Job> = jobs.into_iter().filter_map(|job| queue.submit(job)).collect();
    if ready.is_empty() {
        Vec::new()
    } else {
        vec![CoreCommand::Dispatch(ready)]
    }
}

/// In `--once` mode, request exit when nothing is running or parked.
fn exit_if_idle(queue: &JobQueue, options: &RuntimeOptions, commands: &mut Vec<CoreCommand>) -> bool {
    if options.exit_when_idle && queue.is_idle() {
        commands.push(CoreCommand::RequestExit);
        true
    } else {
        false
    }
}

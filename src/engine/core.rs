// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - listing the vault and reloading the config
//! - sending `Job`s to the executor
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or images.

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::event_handlers::{
    CoreCommand, CoreStep, handle_job_completion, handle_vault_event, handle_vault_scanned,
};
use crate::engine::queue::JobQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::profile::compiled::RuleSet;

/// Whether vault events are acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    Active,
    /// Events are observed but ignored, e.g. while the rule set is swapped.
    Paused,
}

/// Pure core runtime state.
///
/// This owns:
/// - the current compiled rule set (replaced, never mutated)
/// - the per-destination job queue
/// - runtime options (e.g. `exit_when_idle`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    rules: Arc<RuleSet>,
    state: CoreState,
    /// State to return to once a config reload finishes.
    resume_to: Option<CoreState>,
    queue: JobQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(rules: Arc<RuleSet>, options: RuntimeOptions) -> Self {
        Self {
            rules,
            state: CoreState::Active,
            resume_to: None,
            queue: JobQueue::new(),
            options,
        }
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Expose whether no job is running or parked (for tests).
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Vault(vault_event) => {
                if self.state == CoreState::Paused {
                    debug!(?vault_event, "paused; ignoring vault event");
                    return CoreStep::idle();
                }
                handle_vault_event(&self.rules, &mut self.queue, vault_event)
            }
            RuntimeEvent::FullScan { force } => {
                if self.state == CoreState::Paused {
                    debug!(force, "paused; ignoring full scan");
                    return CoreStep::idle();
                }
                CoreStep::with(vec![CoreCommand::ScanVault { force }])
            }
            RuntimeEvent::VaultScanned { files, force } => handle_vault_scanned(
                &self.rules,
                &mut self.queue,
                &self.options,
                files,
                force,
            ),
            RuntimeEvent::Pause => {
                info!("pausing vault sync");
                self.set_state(CoreState::Paused);
                CoreStep::idle()
            }
            RuntimeEvent::Resume => {
                info!("resuming vault sync");
                self.set_state(CoreState::Active);
                CoreStep::idle()
            }
            RuntimeEvent::ReplaceRules(rules) => {
                info!(profiles = rules.profiles().len(), "swapping rule set");
                self.rules = rules;
                CoreStep::idle()
            }
            RuntimeEvent::ConfigChanged => {
                if self.resume_to.is_none() {
                    self.resume_to = Some(self.state);
                }
                self.state = CoreState::Paused;
                CoreStep::with(vec![CoreCommand::ReloadConfig])
            }
            RuntimeEvent::ReloadFinished => {
                if let Some(state) = self.resume_to.take() {
                    debug!(?state, "config reload finished");
                    self.state = state;
                }
                CoreStep::idle()
            }
            RuntimeEvent::JobCompleted { key, outcome } => {
                handle_job_completion(&mut self.queue, &self.options, key, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// Pause / resume requested during a reload apply once it finishes.
    fn set_state(&mut self, state: CoreState) {
        match &mut self.resume_to {
            Some(pending) => *pending = state,
            None => self.state = state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{ConfigFile, ExportProfile, RawConfigFile};
    use crate::engine::{Job, JobKind, JobOutcome, VaultEvent};

    fn rules(track_delete: bool) -> Arc<RuleSet> {
        let mut p = ExportProfile {
            name: "psd".into(),
            ..ExportProfile::default()
        };
        p.path.source_exts = vec!["psd".into()];
        p.path.dest_dir_rel = "exported".into();
        p.path.suffix = "export".into();
        let mut raw = RawConfigFile {
            profiles: vec![p],
            ..RawConfigFile::default()
        };
        raw.settings.track_delete = track_delete;
        Arc::new(RuleSet::compile(&ConfigFile::try_from(raw).unwrap()))
    }

    fn dispatched(step: &CoreStep) -> Vec<Job> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::Dispatch(jobs) => Some(jobs.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn vault(event: VaultEvent) -> RuntimeEvent {
        RuntimeEvent::Vault(event)
    }

    #[test]
    fn create_dispatches_export_for_matching_profile() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let step = core.step(vault(VaultEvent::Create {
            path: "Art/cat.psd".into(),
        }));
        let jobs = dispatched(&step);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].key, "Art/exported/cat.psd.export.png");
        assert!(matches!(jobs[0].kind, JobKind::Export { force: false, .. }));

        let step = core.step(vault(VaultEvent::Create {
            path: "Art/exported/cat.psd.export.png".into(),
        }));
        assert!(dispatched(&step).is_empty());
    }

    #[test]
    fn paused_core_ignores_events_and_scans() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        core.step(RuntimeEvent::Pause);
        let step = core.step(vault(VaultEvent::Modify {
            path: "cat.psd".into(),
        }));
        assert!(step.commands.is_empty());
        assert!(core.step(RuntimeEvent::FullScan { force: true }).commands.is_empty());

        core.step(RuntimeEvent::Resume);
        let step = core.step(RuntimeEvent::FullScan { force: true });
        assert!(matches!(
            step.commands.as_slice(),
            [CoreCommand::ScanVault { force: true }]
        ));
    }

    #[test]
    fn rename_relocates_old_artifact() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let step = core.step(vault(VaultEvent::Rename {
            path: "sub/b.psd".into(),
            old_path: "a.psd".into(),
        }));
        let jobs = dispatched(&step);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].key, "sub/exported/b.psd.export.png");
        match &jobs[0].kind {
            JobKind::Relocate { from } => assert_eq!(from, "exported/a.psd.export.png"),
            other => panic!("unexpected job {other:?}"),
        }
    }

    #[test]
    fn delete_respects_tracking_toggle() {
        let mut off = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let step = off.step(vault(VaultEvent::Delete {
            path: "a.psd".into(),
        }));
        assert!(dispatched(&step).is_empty());

        let mut on = CoreRuntime::new(rules(true), RuntimeOptions::default());
        let step = on.step(vault(VaultEvent::Delete {
            path: "a.psd".into(),
        }));
        let jobs = dispatched(&step);
        assert!(matches!(jobs.as_slice(), [Job { kind: JobKind::Remove, .. }]));
    }

    #[test]
    fn same_destination_is_serialised() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let modify = || {
            vault(VaultEvent::Modify {
                path: "a.psd".into(),
            })
        };

        assert_eq!(dispatched(&core.step(modify())).len(), 1);
        assert!(dispatched(&core.step(modify())).is_empty());
        assert!(dispatched(&core.step(modify())).is_empty());

        let step = core.step(RuntimeEvent::JobCompleted {
            key: "exported/a.psd.export.png".into(),
            outcome: JobOutcome::Exported,
        });
        assert_eq!(dispatched(&step).len(), 1);

        core.step(RuntimeEvent::JobCompleted {
            key: "exported/a.psd.export.png".into(),
            outcome: JobOutcome::UpToDate,
        });
        assert!(core.is_idle());
    }

    #[test]
    fn config_change_pauses_until_rules_are_swapped() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let step = core.step(RuntimeEvent::ConfigChanged);
        assert!(matches!(step.commands.as_slice(), [CoreCommand::ReloadConfig]));
        assert_eq!(core.state(), CoreState::Paused);

        core.step(RuntimeEvent::ReplaceRules(Arc::new(RuleSet::default())));
        core.step(RuntimeEvent::ReloadFinished);
        assert_eq!(core.state(), CoreState::Active);
        let step = core.step(vault(VaultEvent::Create {
            path: "a.psd".into(),
        }));
        assert!(dispatched(&step).is_empty());
    }

    #[test]
    fn reload_keeps_a_user_pause() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        core.step(RuntimeEvent::Pause);
        core.step(RuntimeEvent::ConfigChanged);
        core.step(RuntimeEvent::ReplaceRules(Arc::new(RuleSet::default())));
        core.step(RuntimeEvent::ReloadFinished);
        assert_eq!(core.state(), CoreState::Paused);

        core.step(RuntimeEvent::Resume);
        assert_eq!(core.state(), CoreState::Active);
    }

    #[test]
    fn pause_during_reload_applies_after_it() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        core.step(RuntimeEvent::ConfigChanged);
        core.step(RuntimeEvent::Pause);
        assert_eq!(core.state(), CoreState::Paused);
        core.step(RuntimeEvent::ReloadFinished);
        assert_eq!(core.state(), CoreState::Paused);

        core.step(RuntimeEvent::ConfigChanged);
        core.step(RuntimeEvent::Resume);
        assert_eq!(core.state(), CoreState::Paused);
        core.step(RuntimeEvent::ReloadFinished);
        assert_eq!(core.state(), CoreState::Active);
    }

    #[test]
    fn rename_waits_for_export_of_old_artifact() {
        let mut core = CoreRuntime::new(rules(false), RuntimeOptions::default());
        let step = core.step(vault(VaultEvent::Modify {
            path: "a.psd".into(),
        }));
        assert_eq!(dispatched(&step).len(), 1);

        let step = core.step(vault(VaultEvent::Rename {
            path: "b.psd".into(),
            old_path: "a.psd".into(),
        }));
        assert!(dispatched(&step).is_empty());

        let step = core.step(RuntimeEvent::JobCompleted {
            key: "exported/a.psd.export.png".into(),
            outcome: JobOutcome::Exported,
        });
        let jobs = dispatched(&step);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].key, "exported/b.psd.export.png");
        assert!(matches!(&jobs[0].kind, JobKind::Relocate { from } if from == "exported/a.psd.export.png"));
    }

    #[test]
    fn once_mode_exits_after_scan_drains() {
        let options = RuntimeOptions {
            exit_when_idle: true,
        };
        let mut core = CoreRuntime::new(rules(false), options);

        let step = core.step(RuntimeEvent::VaultScanned {
            files: vec!["a.psd".into(), "notes.md".into()],
            force: false,
        });
        assert!(step.keep_running);
        assert_eq!(dispatched(&step).len(), 1);

        let step = core.step(RuntimeEvent::JobCompleted {
            key: "exported/a.psd.export.png".into(),
            outcome: JobOutcome::Failed("boom".into()),
        });
        assert!(!step.keep_running);

        let mut empty = CoreRuntime::new(rules(false), options);
        let step = empty.step(RuntimeEvent::VaultScanned {
            files: Vec::new(),
            force: false,
        });
        assert!(!step.keep_running);
    }
}

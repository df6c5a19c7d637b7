// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::loader::load_and_validate;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::fs::VaultFs;
use crate::profile::compiled::RuleSet;

use super::core::CoreRuntime;
use super::{CoreCommand, Job, RuntimeEvent};

/// Drives the core in response to `RuntimeEvent`s, and delegates job
/// execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels, listing the vault, reloading the config and dispatching jobs to
/// the executor.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    fs: Arc<dyn VaultFs>,
    config_path: Option<PathBuf>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("config_path", &self.config_path)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        fs: Arc<dyn VaultFs>,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            fs,
            config_path: None,
        }
    }

    /// Config file to re-read on `ConfigChanged`. Without one, a config
    /// change only pauses and resumes.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core. Commands that produce
    ///   follow-up events (scan results, reloaded rules) feed those back
    ///   into the core before the next channel event is read.
    pub async fn run(mut self) -> Result<()> {
        info!("vaultexport runtime started");

        'outer: loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            let mut pending = VecDeque::from([event]);
            while let Some(event) = pending.pop_front() {
                debug!(?event, "runtime received event");

                let step = self.core.step(event);
                for command in step.commands {
                    pending.extend(self.execute_command(command).await?);
                }

                if !step.keep_running {
                    info!("core requested exit; stopping runtime");
                    break 'outer;
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core, returning follow-up events.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<Vec<RuntimeEvent>> {
        match command {
            CoreCommand::Dispatch(jobs) => {
                self.dispatch(jobs).await?;
                Ok(Vec::new())
            }
            CoreCommand::ScanVault { force } => Ok(vec![self.scan(force).await]),
            CoreCommand::ReloadConfig => Ok(self.reload()),
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
                Ok(Vec::new())
            }
        }
    }

    async fn dispatch(&mut self, jobs: Vec<Job>) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }

        let keys: Vec<_> = jobs.iter().map(|j| j.key.as_str()).collect();
        debug!(?keys, "dispatching jobs");

        self.executor.dispatch_jobs(jobs).await
    }

    async fn scan(&self, force: bool) -> RuntimeEvent {
        let fs = self.fs.clone();
        let files = match tokio::task::spawn_blocking(move || fs.list_files()).await {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                warn!(error = %e, "failed to list vault files");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "vault listing task failed");
                Vec::new()
            }
        };
        info!(files = files.len(), force, "full scan");
        RuntimeEvent::VaultScanned { files, force }
    }

    /// Reload + recompile the config. The core stays paused until the
    /// returned `ReloadFinished` is processed, with or without new rules.
    fn reload(&self) -> Vec<RuntimeEvent> {
        let Some(path) = &self.config_path else {
            return vec![RuntimeEvent::ReloadFinished];
        };

        match load_and_validate(path) {
            Ok(cfg) => {
                info!(path = ?path, "config reloaded");
                vec![
                    RuntimeEvent::ReplaceRules(Arc::new(RuleSet::compile(&cfg))),
                    RuntimeEvent::ReloadFinished,
                ]
            }
            Err(e) => {
                error!(path = ?path, error = %e, "config reload failed; keeping previous rules");
                vec![RuntimeEvent::ReloadFinished]
            }
        }
    }
}

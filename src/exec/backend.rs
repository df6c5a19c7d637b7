// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning work
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation here.
//!
//! - `RealExecutorBackend` is the default implementation used by
//!   `vaultexport`. It spawns one Tokio task per job and reports each
//!   outcome back as `RuntimeEvent::JobCompleted`.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which jobs were dispatched and directly emits `JobCompleted` events.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{Job, RuntimeEvent};
use crate::errors::Result;
use crate::export::executor::Exporter;

use super::job_runner::run_job;

/// Trait abstracting how dispatched jobs are executed.
///
/// Production code uses [`RealExecutorBackend`]; tests can provide their own
/// implementation that doesn't touch images or the disk.
pub trait ExecutorBackend: Send {
    /// Dispatch the given jobs for execution.
    ///
    /// Must not wait for the jobs to finish: completion is reported through
    /// `RuntimeEvent::JobCompleted`.
    fn dispatch_jobs(
        &mut self,
        jobs: Vec<Job>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
#[derive(Debug, Clone)]
pub struct RealExecutorBackend {
    exporter: Exporter,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealExecutorBackend {
    /// Create a new real executor backend, wiring it to the given runtime
    /// event sender.
    pub fn new(exporter: Exporter, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            exporter,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn dispatch_jobs(
        &mut self,
        jobs: Vec<Job>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone handles so the spawned tasks don't borrow `self`.
        let exporter = self.exporter.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            for job in jobs {
                let exporter = exporter.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let key = job.key.clone();
                    let outcome = run_job(&exporter, &job).await;
                    if tx
                        .send(RuntimeEvent::JobCompleted { key, outcome })
                        .await
                        .is_err()
                    {
                        debug!(key = %job.key, "runtime gone; dropping job completion");
                    }
                });
            }
            Ok(())
        })
    }
}

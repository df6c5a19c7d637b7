use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use vaultexport::engine::{Job, JobOutcome, RuntimeEvent};
use vaultexport::errors::Result;
use vaultexport::exec::ExecutorBackend;

/// A fake executor that:
/// - records the label and key of every dispatched job
/// - immediately reports `JobCompleted` with `outcome` for each job.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    outcome: JobOutcome,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            outcome: JobOutcome::Exported,
        }
    }

    pub fn with_outcome(mut self, outcome: JobOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch_jobs(
        &mut self,
        jobs: Vec<Job>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = self.outcome.clone();

        Box::pin(async move {
            for job in jobs {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(format!("{} {}", job.label(), job.key));
                }

                tx.send(RuntimeEvent::JobCompleted {
                    key: job.key.clone(),
                    outcome: outcome.clone(),
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}

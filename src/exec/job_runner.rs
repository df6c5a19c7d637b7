// src/exec/job_runner.rs

//! Individual job runner.

use tracing::{error, warn};

use crate::engine::{Job, JobKind, JobOutcome};
use crate::errors::ExportError;
use crate::export::executor::{ExportOutcome, Exporter, RelocateOutcome};

/// Run a single job and turn its result into a [`JobOutcome`].
///
/// Failures are logged here and never escape: one broken file must not
/// affect other files or profiles.
pub async fn run_job(exporter: &Exporter, job: &Job) -> JobOutcome {
    match run_job_inner(exporter, job).await {
        Ok(outcome) => outcome,
        Err(err) => {
            match &err {
                ExportError::NoDestinationName(_) | ExportError::EmptyFileName { .. } => {
                    warn!(key = %job.key, kind = job.label(), error = %err, "skipping job")
                }
                _ => error!(key = %job.key, kind = job.label(), error = %err, "job failed"),
            }
            JobOutcome::Failed(err.to_string())
        }
    }
}

async fn run_job_inner(exporter: &Exporter, job: &Job) -> Result<JobOutcome, ExportError> {
    match &job.kind {
        JobKind::Export {
            source,
            profile,
            force,
        } => Ok(match exporter.export(source, profile, *force).await? {
            ExportOutcome::Written(_) => JobOutcome::Exported,
            ExportOutcome::UpToDate(_) => JobOutcome::UpToDate,
        }),
        JobKind::Relocate { from } => Ok(match exporter.relocate(from, &job.key)? {
            RelocateOutcome::Moved { .. } => JobOutcome::Relocated,
            RelocateOutcome::NothingToMove | RelocateOutcome::Unchanged => JobOutcome::NothingToDo,
        }),
        JobKind::Remove => Ok(if exporter.remove(&job.key)? {
            JobOutcome::Removed
        } else {
            JobOutcome::NothingToDo
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::export::engine::EngineRegistry;
    use crate::fs::mock::MockVaultFs;
    use crate::profile::compiled::RuntimeExportProfile;

    fn exporter(fs: &MockVaultFs) -> Exporter {
        Exporter::new(Arc::new(fs.clone()), Arc::new(EngineRegistry::new()))
    }

    #[tokio::test]
    async fn relocate_without_artifact_is_nothing_to_do() {
        let fs = MockVaultFs::new();
        let job = Job {
            key: "new/a.png".into(),
            kind: JobKind::Relocate {
                from: "old/a.png".into(),
            },
        };
        assert_eq!(run_job(&exporter(&fs), &job).await, JobOutcome::NothingToDo);
        assert_eq!(fs.rename_count(), 0);
    }

    #[tokio::test]
    async fn export_failure_is_reported_not_raised() {
        let fs = MockVaultFs::new();
        let job = Job {
            key: "a.png".into(),
            kind: JobKind::Export {
                source: "a.psd".into(),
                profile: Arc::new(RuntimeExportProfile::default()),
                force: false,
            },
        };
        let outcome = run_job(&exporter(&fs), &job).await;
        assert!(matches!(outcome, JobOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn remove_existing_artifact() {
        let fs = MockVaultFs::new();
        fs.add_file("exported/a.png", "x");
        let job = Job {
            key: "exported/a.png".into(),
            kind: JobKind::Remove,
        };
        assert_eq!(run_job(&exporter(&fs), &job).await, JobOutcome::Removed);
        assert!(fs.file("exported/a.png").is_none());
    }
}

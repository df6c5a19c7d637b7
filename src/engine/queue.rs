// src/engine/queue.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::{Job, JobKey, JobKind};

/// Per-destination job queue.
///
/// Semantics:
/// - Every job claims its key (artifact path). A relocation also claims the
///   artifact path it moves from.
/// - At most one job per claimed path is in flight at a time.
/// - A job whose claims overlap a running job is parked under its key. Only
///   the latest parked job per key is kept; when both the parked and the new
///   job are exports their `force` flags are OR-ed.
/// - When a job completes its claims are released, and every parked job
///   whose claims are now free becomes in flight and is handed back.
///
/// This turns "last write wins" into "last event wins" for rapid edits.
#[derive(Debug, Default)]
pub struct JobQueue {
    /// Running jobs by key, with every path they claim.
    in_flight: HashMap<JobKey, Vec<JobKey>>,
    claimed: HashSet<JobKey>,
    parked: BTreeMap<JobKey, Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// No job running and none waiting.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.parked.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn parked(&self) -> usize {
        self.parked.len()
    }

    /// Some running job claims `key`.
    pub fn is_busy(&self, key: &str) -> bool {
        self.claimed.contains(key)
    }

    /// Submit a job. Returns it back if it may be dispatched now.
    pub fn submit(&mut self, job: Job) -> Option<Job> {
        if !self.parked.contains_key(&job.key) && self.is_free(&job) {
            self.claim(&job);
            return Some(job);
        }

        let job = match self.parked.remove(&job.key) {
            Some(previous) => merge(previous, job),
            None => job,
        };
        debug!(key = %job.key, kind = job.label(), "destination busy; parked job");
        self.parked.insert(job.key.clone(), job);
        None
    }

    /// Mark the job for `key` as finished. Returns the parked jobs that could
    /// start as a result, already in flight.
    pub fn complete(&mut self, key: &str) -> Vec<Job> {
        if let Some(claims) = self.in_flight.remove(key) {
            for claim in claims {
                self.claimed.remove(&claim);
            }
        }

        let waiting: Vec<JobKey> = self.parked.keys().cloned().collect();
        let mut ready = Vec::new();
        for key in waiting {
            if !self.parked.get(&key).is_some_and(|job| self.is_free(job)) {
                continue;
            }
            if let Some(job) = self.parked.remove(&key) {
                self.claim(&job);
                ready.push(job);
            }
        }
        ready
    }

    fn is_free(&self, job: &Job) -> bool {
        claims(job).iter().all(|c| !self.claimed.contains(*c))
    }

    fn claim(&mut self, job: &Job) {
        let claims: Vec<JobKey> = claims(job).into_iter().map(str::to_string).collect();
        self.claimed.extend(claims.iter().cloned());
        self.in_flight.insert(job.key.clone(), claims);
    }
}

fn claims(job: &Job) -> Vec<&str> {
    match &job.kind {
        JobKind::Relocate { from } => vec![job.key.as_str(), from.as_str()],
        JobKind::Export { .. } | JobKind::Remove => vec![job.key.as_str()],
    }
}

fn merge(previous: Job, mut next: Job) -> Job {
    if let (
        JobKind::Export {
            force: prev_force, ..
        },
        JobKind::Export { force, .. },
    ) = (&previous.kind, &mut next.kind)
    {
        *force |= *prev_force;
    }
    next
}

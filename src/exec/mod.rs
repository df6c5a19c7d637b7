// src/exec/mod.rs

//! Job execution layer.
//!
//! This module is responsible for actually running the jobs dispatched by
//! the orchestrator (export, relocate, remove) and reporting back to the
//! runtime via `RuntimeEvent::JobCompleted`.
//!
//! - [`job_runner`] runs a single job against an `Exporter`.
//! - [`backend`] provides the `ExecutorBackend` trait and a concrete
//!   `RealExecutorBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod job_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use job_runner::run_job;

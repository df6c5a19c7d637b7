// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) on the vault.
//! - Translating raw notify events into vault create / modify / rename /
//!   delete events with vault-relative paths.
//! - Reporting changes to the config file so rules can be swapped.
//!
//! It does **not** know about profiles; matching happens in the engine.

pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use event_handler::EventTranslator;
pub use watcher::{WatcherHandle, spawn_watcher};

// src/errors.rs

//! Crate-wide error types.
//!
//! - [`VaultExportError`] covers process-level failures (config, IO).
//! - [`ExportError`] covers a single (file, profile) export operation. These
//!   are reported per file and never stop the orchestrator.
//! - [`FilterCompileError`] is only ever logged: a bad regex degrades into a
//!   filter that matches nothing.

use thiserror::Error;

use crate::export::engine::EngineError;

#[derive(Error, Debug)]
pub enum VaultExportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of one export / relocation / removal for one source file.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The explicit destination given to an ad-hoc export has no file name.
    #[error("no destination file name in '{0}'")]
    NoDestinationName(String),

    /// The filename template produced an empty (or whitespace-only) name.
    #[error("filename template '{template}' produced an empty name for '{source_path}'")]
    EmptyFileName {
        template: String,
        source_path: String,
    },

    #[error("image engine failed for '{path}': {source}")]
    Engine {
        path: String,
        #[source]
        source: EngineError,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("source file '{0}' does not exist")]
    SourceMissing(String),

    #[error("unsupported export format '{0}'")]
    UnsupportedFormat(String),

    #[error("unknown export profile '{0}'")]
    UnknownProfile(String),
}

/// A user regex filter that failed to compile.
#[derive(Error, Debug)]
#[error("invalid filter pattern '{pattern}': {source}")]
pub struct FilterCompileError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, VaultExportError>;

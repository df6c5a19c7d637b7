// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{ArgGroup, Parser, ValueEnum};

/// Command-line arguments for `vaultexport`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vaultexport",
    version,
    about = "Keep exported image artifacts in sync with the files of a vault.",
    long_about = None
)]
#[command(group(ArgGroup::new("export_target").args(["profile", "dest"])))]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "VaultExport.toml")]
    pub config: String,

    /// Vault root directory. Overrides `[settings].vault` from the config.
    #[arg(long, value_name = "PATH")]
    pub vault: Option<String>,

    /// Run one full scan, wait for its exports and exit (no watching).
    #[arg(long)]
    pub once: bool,

    /// Re-export even when the existing artifact is current.
    #[arg(long)]
    pub force: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VAULTEXPORT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and compile the config, print the profiles, export nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Export a single vault file right now and print the destination path.
    #[arg(long, value_name = "FILE", requires = "export_target")]
    pub export: Option<String>,

    /// Profile name used by `--export`.
    #[arg(long, value_name = "NAME", requires = "export")]
    pub profile: Option<String>,

    /// Explicit vault-relative destination used by `--export`.
    #[arg(long, value_name = "PATH", requires = "export")]
    pub dest: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

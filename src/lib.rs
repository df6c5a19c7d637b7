// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod export;
pub mod fs;
pub mod logging;
pub mod profile;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RealExecutorBackend;
use crate::export::{EngineRegistry, ExportTarget, Exporter};
use crate::fs::{DiskVaultFs, VaultFs};
use crate::profile::RuleSet;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and rule compilation
/// - the exporter (disk store + image engines)
/// - core / runtime / executor
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let rules = Arc::new(RuleSet::compile(&cfg));
    let vault_root = vault_root(args.vault.as_deref(), &cfg, &config_path);

    if args.dry_run {
        print_dry_run(&cfg, &rules, &vault_root);
        return Ok(());
    }

    let fs: Arc<dyn VaultFs> = Arc::new(DiskVaultFs::new(&vault_root));
    let engines = Arc::new(EngineRegistry::with_default_engines(
        &cfg.settings().supported_formats,
    ));
    let exporter = Exporter::new(fs.clone(), engines);

    // One-off export, no runtime.
    if let Some(source) = args.export.as_deref() {
        let target = match (&args.profile, &args.dest) {
            (Some(name), _) => ExportTarget::Profile(name.clone()),
            (None, Some(dst)) => ExportTarget::Destination(dst.clone()),
            (None, None) => anyhow::bail!("--export needs --profile or --dest"),
        };
        let outcome = exporter
            .export_now(source, &target, &rules, args.force)
            .await?;
        println!("{}", outcome.path());
        return Ok(());
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(256);

    let executor = RealExecutorBackend::new(exporter, rt_tx.clone());

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        Some(crate::watch::spawn_watcher(
            &vault_root,
            Some(config_path.clone()),
            rt_tx.clone(),
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Startup scan brings every artifact up to date.
    info!(vault = ?vault_root, profiles = rules.profiles().len(), "initial full scan");
    rt_tx
        .send(RuntimeEvent::FullScan { force: args.force })
        .await?;

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let core = CoreRuntime::new(rules, options);
    let runtime = Runtime::new(core, rt_rx, executor, fs).with_config_path(config_path);
    runtime.run().await?;
    Ok(())
}

/// Resolve the vault root.
///
/// - `--vault` wins if given.
/// - Otherwise `[settings].vault`; a relative value is taken relative to the
///   directory holding the config file (or the current directory for a bare
///   file name like "VaultExport.toml").
fn vault_root(cli_vault: Option<&str>, cfg: &ConfigFile, config_path: &Path) -> PathBuf {
    if let Some(v) = cli_vault {
        return PathBuf::from(v);
    }

    let configured = PathBuf::from(&cfg.settings().vault);
    if configured.is_absolute() {
        return configured;
    }

    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(configured)
}

/// Dry-run output: settings, then each profile with its compiled stages.
fn print_dry_run(cfg: &ConfigFile, rules: &RuleSet, vault_root: &Path) {
    let settings = cfg.settings();
    println!("vaultexport dry-run");
    println!("  vault = {}", vault_root.display());
    println!("  track_rename = {}", settings.track_rename);
    println!("  track_delete = {}", settings.track_delete);
    println!("  export_formats = {:?}", settings.export_formats);
    println!("  supported_formats = {:?}", settings.supported_formats);
    println!();

    println!("profiles ({}):", cfg.profiles().len());
    for profile in cfg.profiles() {
        let compiled = rules.profile(&profile.name);
        let state = if compiled.is_some() { "active" } else { "inactive" };
        println!("  - {} [{state}]", profile.name);
        println!(
            "      format: {} ({})",
            profile.format.ext, profile.format.mime_type
        );
        println!("      quality: {}", profile.image.quality);

        let Some(compiled) = compiled else {
            continue;
        };
        for stage in compiled.predicate().stages() {
            println!("      filter: {stage:?}");
        }
        for step in compiled.size_transform().steps() {
            println!("      size: {step:?}");
        }
    }

    debug!("dry-run complete (no export)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_str;

    #[test]
    fn vault_root_prefers_cli_then_config_dir() {
        let cfg: ConfigFile = parse_str("[settings]\nvault = \"notes\"\n")
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(
            vault_root(Some("/elsewhere"), &cfg, Path::new("cfg/VaultExport.toml")),
            PathBuf::from("/elsewhere")
        );
        assert_eq!(
            vault_root(None, &cfg, Path::new("cfg/VaultExport.toml")),
            PathBuf::from("cfg/notes")
        );
    }
}

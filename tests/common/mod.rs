#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc;

use vaultexport::config::ConfigFile;
use vaultexport::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use vaultexport::exec::RealExecutorBackend;
use vaultexport::export::{EngineRegistry, Exporter};
use vaultexport::fs::mock::MockVaultFs;
use vaultexport::profile::RuleSet;

pub use vaultexport_test_utils::builders::{ConfigFileBuilder, ProfileBuilder};
pub use vaultexport_test_utils::fake_engine::FakeEngine;
pub use vaultexport_test_utils::{init_tracing, with_timeout};

/// `*.psd` anywhere in the vault, exported next to the source under
/// `exported/` as `<name>.<ext>.export.png`.
pub fn psd_to_png_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .track_delete(true)
        .with_profile(
            ProfileBuilder::new("psd to png")
                .source_exts(&["psd"])
                .dest_rel("exported")
                .suffix("export")
                .build(),
        )
        .build()
}

/// Exporter over `fs` that renders every `exts` source with `engine`.
pub fn exporter(fs: &MockVaultFs, engine: &FakeEngine, exts: &[&str]) -> Exporter {
    let mut engines = EngineRegistry::new();
    for ext in exts {
        engines.register(ext, Arc::new(engine.clone()));
    }
    Exporter::new(Arc::new(fs.clone()), Arc::new(engines))
}

/// Run a runtime that exits once idle, feeding it `events` up front.
pub async fn run_until_idle(
    cfg: &ConfigFile,
    fs: &MockVaultFs,
    exporter: Exporter,
    events: Vec<RuntimeEvent>,
) {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    for event in events {
        tx.send(event).await.unwrap();
    }

    let executor = RealExecutorBackend::new(exporter, tx.clone());
    let core = CoreRuntime::new(
        Arc::new(RuleSet::compile(cfg)),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let runtime = Runtime::new(core, rx, executor, Arc::new(fs.clone()));

    with_timeout(runtime.run()).await.unwrap();
}

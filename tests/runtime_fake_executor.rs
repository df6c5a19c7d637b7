// tests/runtime_fake_executor.rs

mod common;
use crate::common::{ConfigFileBuilder, ProfileBuilder, init_tracing, psd_to_png_config};

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use vaultexport::config::{ConfigFile, save_to_path};
use vaultexport::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, VaultEvent};
use vaultexport::fs::mock::MockVaultFs;
use vaultexport::profile::RuleSet;
use vaultexport_test_utils::fake_executor::FakeExecutor;

type TestResult = Result<(), Box<dyn Error>>;

fn vault() -> MockVaultFs {
    let fs = MockVaultFs::new();
    fs.add_file("a.psd", b"a".to_vec());
    fs.add_file("Art/b.psd", b"b".to_vec());
    fs.add_file("Art/c.png", b"c".to_vec());
    fs
}

/// Run a runtime over `fs` with a recording fake executor, feeding it
/// `events` up front, and return what was dispatched.
async fn run_recorded(
    cfg: &ConfigFile,
    fs: &MockVaultFs,
    config_path: Option<&std::path::Path>,
    events: Vec<RuntimeEvent>,
) -> Result<Vec<String>, Box<dyn Error>> {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(32);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));

    let core = CoreRuntime::new(
        Arc::new(RuleSet::compile(cfg)),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let mut runtime = Runtime::new(core, rx, executor, Arc::new(fs.clone()));
    if let Some(path) = config_path {
        runtime = runtime.with_config_path(path);
    }

    for event in events {
        tx.send(event).await?;
    }

    timeout(Duration::from_secs(5), runtime.run()).await??;

    let mut out = executed.lock().unwrap().clone();
    out.sort();
    Ok(out)
}

#[tokio::test]
async fn once_mode_scans_and_exits() -> TestResult {
    init_tracing();

    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        None,
        vec![RuntimeEvent::FullScan { force: false }],
    )
    .await?;

    assert_eq!(
        executed,
        vec![
            "export Art/exported/b.psd.export.png".to_string(),
            "export exported/a.psd.export.png".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn once_mode_exits_on_empty_scan() -> TestResult {
    init_tracing();

    let executed = run_recorded(
        &psd_to_png_config(),
        &MockVaultFs::new(),
        None,
        vec![RuntimeEvent::FullScan { force: false }],
    )
    .await?;

    assert!(executed.is_empty());
    Ok(())
}

#[tokio::test]
async fn paused_runtime_ignores_scans_and_events() -> TestResult {
    init_tracing();

    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        None,
        vec![
            RuntimeEvent::Pause,
            RuntimeEvent::FullScan { force: false },
            RuntimeEvent::Vault(VaultEvent::Create {
                path: "a.psd".into(),
            }),
            RuntimeEvent::Resume,
            RuntimeEvent::Vault(VaultEvent::Modify {
                path: "a.psd".into(),
            }),
        ],
    )
    .await?;

    assert_eq!(executed, vec!["export exported/a.psd.export.png".to_string()]);
    Ok(())
}

#[tokio::test]
async fn config_change_swaps_rules_before_the_next_scan() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("VaultExport.toml");
    let png_cfg = ConfigFileBuilder::new()
        .with_profile(
            ProfileBuilder::new("png to webp")
                .source_exts(&["png"])
                .format("webp")
                .dest_rel("web")
                .template("${name}.${dst_ext}")
                .build(),
        )
        .build();
    save_to_path(&path, &png_cfg)?;

    // Start with the psd rules; the file on disk says png.
    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        Some(&path),
        vec![
            RuntimeEvent::ConfigChanged,
            RuntimeEvent::FullScan { force: false },
        ],
    )
    .await?;

    assert_eq!(executed, vec!["export Art/web/c.webp".to_string()]);
    Ok(())
}

#[tokio::test]
async fn broken_config_keeps_previous_rules() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("VaultExport.toml");
    std::fs::write(&path, "[[profile]]\nname = \"\"\n")?;

    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        Some(&path),
        vec![
            RuntimeEvent::ConfigChanged,
            RuntimeEvent::FullScan { force: false },
        ],
    )
    .await?;

    assert_eq!(executed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn config_change_does_not_resume_a_paused_runtime() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("VaultExport.toml");
    let png_cfg = ConfigFileBuilder::new()
        .with_profile(
            ProfileBuilder::new("png to webp")
                .source_exts(&["png"])
                .format("webp")
                .dest_rel("web")
                .template("${name}.${dst_ext}")
                .build(),
        )
        .build();
    save_to_path(&path, &png_cfg)?;

    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        Some(&path),
        vec![
            RuntimeEvent::Pause,
            RuntimeEvent::ConfigChanged,
            RuntimeEvent::FullScan { force: false },
            RuntimeEvent::Vault(VaultEvent::Create {
                path: "Art/c.png".into(),
            }),
            RuntimeEvent::ShutdownRequested,
        ],
    )
    .await?;
    assert!(executed.is_empty());

    let executed = run_recorded(
        &psd_to_png_config(),
        &vault(),
        Some(&path),
        vec![
            RuntimeEvent::Pause,
            RuntimeEvent::ConfigChanged,
            RuntimeEvent::Resume,
            RuntimeEvent::FullScan { force: false },
        ],
    )
    .await?;
    assert_eq!(executed, vec!["export Art/web/c.webp".to_string()]);
    Ok(())
}

// tests/demos_configs.rs

use std::path::PathBuf;

use vaultexport::config::load_and_validate;
use vaultexport::export::{EngineRegistry, ExportFormat};
use vaultexport::profile::{RuleSet, Size};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

#[test]
fn default_demo_loads_and_compiles() {
    let cfg = load_and_validate(demo("VaultExport.toml")).expect("demo config is valid");
    assert_eq!(cfg.profiles().len(), 2);
    assert!((cfg.instant_export().image.quality - 0.9).abs() < f32::EPSILON);

    let rules = RuleSet::compile(&cfg);
    assert!(rules.track_rename());
    assert!(!rules.track_delete());

    let names = |path: &str| -> Vec<String> {
        rules
            .matching(path)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    };
    assert_eq!(names("Art/portraits/anna.psd"), vec!["art to png".to_string()]);
    assert!(names("Art/portraits/anna-WIP.psd").is_empty());
    assert_eq!(names("Photos/2024/beach.JPG"), vec!["thumbnails".to_string()]);
    assert!(names("Attachments/thumbs/Photos/2024/beach.webp").is_empty());

    let engines = EngineRegistry::with_default_engines(&cfg.settings().supported_formats);
    for profile in cfg.profiles() {
        for ext in &profile.path.source_exts {
            assert!(engines.supports(ext), "{}: no engine for {ext}", profile.name);
        }
    }

    let thumbs = rules.profile("thumbnails").unwrap();
    let adj = thumbs.adjust(Size::new(2048.0, 1024.0));
    assert_eq!(adj.pixel_size(), (512, 256));
    assert_eq!(thumbs.profile().format, ExportFormat::webp());
}

#[test]
fn mirror_demo_loads_and_compiles() {
    let cfg = load_and_validate(demo("mirror.toml")).expect("demo config is valid");
    let rules = RuleSet::compile(&cfg);

    assert_eq!(rules.profiles().len(), 1, "inactive profiles are not compiled");
    assert!(rules.track_delete());
    assert!(rules.matching("drawing.png").len() == 1);
    assert!(rules.matching("previews/drawing.png").is_empty());
    assert!(rules.matching("drawing.bmp").is_empty());

    let adj = rules
        .profile("mirror preview")
        .unwrap()
        .adjust(Size::new(100.0, 50.0));
    assert!(adj.flip_x());
    assert!(!adj.flip_y());
    assert_eq!(adj.pixel_size(), (512, 256));
}

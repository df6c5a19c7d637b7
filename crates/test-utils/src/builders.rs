#![allow(dead_code)]

use vaultexport::config::{
    BuiltInFilter, ConfigFile, ExportProfile, RawConfigFile, SizeRule, TextFilter,
};
use vaultexport::export::ExportFormat;
use vaultexport::types::{BuiltInFilterKind, FolderMode, SizeRuleKind, TextFilterKind};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_profile(mut self, profile: ExportProfile) -> Self {
        self.config.profiles.push(profile);
        self
    }

    pub fn track_rename(mut self, val: bool) -> Self {
        self.config.settings.track_rename = val;
        self
    }

    pub fn track_delete(mut self, val: bool) -> Self {
        self.config.settings.track_delete = val;
        self
    }

    pub fn export_formats(mut self, exts: &[&str]) -> Self {
        self.config.settings.export_formats = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_instant_export(mut self, profile: ExportProfile) -> Self {
        self.config.instant_export = profile;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ExportProfile`.
///
/// Starts from the same defaults a `[[profile]]` table gets: active,
/// recursive, PNG output and the double-extension blocker enabled.
pub struct ProfileBuilder {
    profile: ExportProfile,
}

impl ProfileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            profile: ExportProfile {
                name: name.to_string(),
                ..ExportProfile::default()
            },
        }
    }

    pub fn inactive(mut self) -> Self {
        self.profile.active = false;
        self
    }

    pub fn format(mut self, ext: &str) -> Self {
        self.profile.format =
            ExportFormat::from_ext(ext).unwrap_or_else(|| ExportFormat::new(ext, ""));
        self
    }

    pub fn quality(mut self, q: f32) -> Self {
        self.profile.image.quality = q;
        self
    }

    pub fn size(mut self, kind: SizeRuleKind, x: Option<f64>, y: Option<f64>) -> Self {
        self.profile
            .image
            .size_adjustments
            .push(SizeRule { kind, x, y });
        self
    }

    pub fn source_dir(mut self, dir: &str, recursive: bool) -> Self {
        self.profile.path.source_dir = dir.to_string();
        self.profile.path.recursive = recursive;
        self
    }

    pub fn source_exts(mut self, exts: &[&str]) -> Self {
        self.profile.path.source_exts = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn filter(mut self, kind: TextFilterKind, content: &str) -> Self {
        self.profile.path.filters.push(TextFilter {
            kind,
            content: content.to_string(),
            case_insensitive: false,
            active: true,
        });
        self
    }

    pub fn double_extension_blocker(mut self, active: bool) -> Self {
        self.profile.path.builtin_filters = vec![BuiltInFilter {
            kind: BuiltInFilterKind::DoubleExtensionBlocker,
            active,
        }];
        self
    }

    /// `Relative` mode with `dest_dir_rel = dir`.
    pub fn dest_rel(mut self, dir: &str) -> Self {
        self.profile.path.folder_mode = FolderMode::Relative;
        self.profile.path.dest_dir_rel = dir.to_string();
        self
    }

    pub fn dest_abs(mut self, mode: FolderMode, dir: &str) -> Self {
        self.profile.path.folder_mode = mode;
        self.profile.path.dest_dir_abs = dir.to_string();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.profile.path.prefix = prefix.to_string();
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.profile.path.suffix = suffix.to_string();
        self
    }

    pub fn template(mut self, template: &str) -> Self {
        self.profile.path.filename_template = Some(template.to_string());
        self
    }

    pub fn build(self) -> ExportProfile {
        self.profile
    }
}

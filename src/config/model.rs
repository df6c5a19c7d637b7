// src/config/model.rs

use serde::{Deserialize, Serialize};

use crate::export::format::ExportFormat;
use crate::types::{BuiltInFilterKind, FolderMode, SizeRuleKind, TextFilterKind};

/// Top-level configuration exactly as read from / written to TOML.
///
/// ```toml
/// [settings]
/// vault = "."
/// track_rename = true
///
/// [[profile]]
/// name = "psd to png"
/// format = { ext = "png", mime_type = "image/png" }
///
/// [profile.path]
/// source_exts = ["psd"]
/// dest_dir_rel = "exported"
/// suffix = "export"
/// ```
///
/// Every field has a default, so files written by older versions still load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,

    /// Settings used by ad-hoc exports with an explicit destination.
    #[serde(default = "default_instant_export")]
    pub instant_export: ExportProfile,

    #[serde(default, rename = "profile")]
    pub profiles: Vec<ExportProfile>,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            settings: SettingsSection::default(),
            instant_export: default_instant_export(),
            profiles: Vec::new(),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    settings: SettingsSection,
    instant_export: ExportProfile,
    profiles: Vec<ExportProfile>,
}

impl ConfigFile {
    /// Construct without validation. Use `ConfigFile::try_from(raw)` instead.
    pub(crate) fn new_unchecked(
        settings: SettingsSection,
        instant_export: ExportProfile,
        profiles: Vec<ExportProfile>,
    ) -> Self {
        Self {
            settings,
            instant_export,
            profiles,
        }
    }

    pub fn settings(&self) -> &SettingsSection {
        &self.settings
    }

    pub fn instant_export(&self) -> &ExportProfile {
        &self.instant_export
    }

    pub fn profiles(&self) -> &[ExportProfile] {
        &self.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&ExportProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Back to the serialisable form, e.g. for saving.
    pub fn to_raw(&self) -> RawConfigFile {
        RawConfigFile {
            settings: self.settings.clone(),
            instant_export: self.instant_export.clone(),
            profiles: self.profiles.clone(),
        }
    }
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsSection {
    /// Vault root. Relative paths are resolved against the config file's
    /// directory.
    #[serde(default = "default_vault")]
    pub vault: String,

    /// Move artifacts along when their source is renamed.
    #[serde(default = "default_true")]
    pub track_rename: bool,

    /// Remove artifacts when their source is deleted.
    #[serde(default)]
    pub track_delete: bool,

    /// Formats allowed as the target of an ad-hoc export.
    #[serde(default = "default_export_formats")]
    pub export_formats: Vec<String>,

    /// Source extensions the image engine is allowed to decode.
    #[serde(default = "default_supported_formats")]
    pub supported_formats: Vec<String>,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            track_rename: true,
            track_delete: false,
            export_formats: default_export_formats(),
            supported_formats: default_supported_formats(),
        }
    }
}

/// One `[[profile]]` entry: a named, independently activatable rule set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExportProfile {
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub format: ExportFormat,

    #[serde(default)]
    pub image: ImageProps,

    #[serde(default)]
    pub path: PathOptions,
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self {
            active: true,
            name: String::new(),
            format: ExportFormat::default(),
            image: ImageProps::default(),
            path: PathOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageProps {
    /// Encoder quality in `0.0..=1.0`.
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Size rules, applied in order.
    #[serde(default, rename = "size")]
    pub size_adjustments: Vec<SizeRule>,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            size_adjustments: Vec::new(),
        }
    }
}

/// A declarative size rule. At most one of `x` / `y` may be omitted; the
/// missing axis follows the aspect ratio seen before the rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SizeRule {
    pub kind: SizeRuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// `[profile.path]`: which sources qualify and where artifacts go.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathOptions {
    #[serde(default)]
    pub source_dir: String,

    #[serde(default = "default_true")]
    pub recursive: bool,

    #[serde(default)]
    pub source_exts: Vec<String>,

    #[serde(default)]
    pub filters: Vec<TextFilter>,

    #[serde(default = "default_builtin_filters")]
    pub builtin_filters: Vec<BuiltInFilter>,

    #[serde(default)]
    pub folder_mode: FolderMode,

    #[serde(default)]
    pub dest_dir_abs: String,

    #[serde(default)]
    pub dest_dir_rel: String,

    /// Custom name template using `${name}`, `${ext}` and `${dst_ext}`.
    /// When unset the name is built from `prefix` / `suffix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_template: Option<String>,

    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            source_dir: String::new(),
            recursive: true,
            source_exts: Vec::new(),
            filters: Vec::new(),
            builtin_filters: default_builtin_filters(),
            folder_mode: FolderMode::default(),
            dest_dir_abs: String::new(),
            dest_dir_rel: String::new(),
            filename_template: None,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextFilter {
    pub kind: TextFilterKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuiltInFilter {
    pub kind: BuiltInFilterKind,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

fn default_vault() -> String {
    ".".to_string()
}

fn default_quality() -> f32 {
    1.0
}

fn default_export_formats() -> Vec<String> {
    ExportFormat::builtin().into_iter().map(|f| f.ext).collect()
}

fn default_supported_formats() -> Vec<String> {
    [
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "tif", "tiff", "webp", "tga", "pbm", "pgm",
        "ppm", "pnm", "psd", "psb",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_builtin_filters() -> Vec<BuiltInFilter> {
    vec![BuiltInFilter {
        kind: BuiltInFilterKind::DoubleExtensionBlocker,
        active: true,
    }]
}

fn default_instant_export() -> ExportProfile {
    ExportProfile {
        name: "instant export".to_string(),
        ..ExportProfile::default()
    }
}

// src/profile/compiled.rs

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::model::{ConfigFile, ExportProfile};
use crate::errors::ExportError;
use crate::export::format::ExportFormat;
use crate::profile::filter::{KnownExtensions, SourcePredicate, compile_source_predicate, normalize_ext};
use crate::profile::size::{Size, SizeAdjustment, SizeTransform};

/// Executable form of an [`ExportProfile`]: the profile snapshot it was
/// built from plus its compiled predicate and size transform.
#[derive(Debug, Clone, Default)]
pub struct RuntimeExportProfile {
    profile: ExportProfile,
    size_transform: SizeTransform,
    predicate: SourcePredicate,
}

impl RuntimeExportProfile {
    pub fn compile(profile: &ExportProfile, known: &KnownExtensions) -> Self {
        Self {
            profile: profile.clone(),
            size_transform: SizeTransform::compile(&profile.image.size_adjustments),
            predicate: compile_source_predicate(&profile.path, known),
        }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &ExportProfile {
        &self.profile
    }

    pub fn predicate(&self) -> &SourcePredicate {
        &self.predicate
    }

    pub fn size_transform(&self) -> &SizeTransform {
        &self.size_transform
    }

    pub fn matches(&self, path: &str) -> bool {
        self.predicate.matches(path)
    }

    pub fn adjust(&self, size: Size) -> SizeAdjustment {
        self.size_transform.apply(size)
    }
}

/// The complete compiled rule set. Replaced as a whole (behind an `Arc`)
/// whenever the configuration changes.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    profiles: Vec<Arc<RuntimeExportProfile>>,
    known_exts: KnownExtensions,
    instant: Arc<RuntimeExportProfile>,
    export_formats: Vec<ExportFormat>,
    track_rename: bool,
    track_delete: bool,
}

impl RuleSet {
    /// Compile every active profile of `cfg`.
    pub fn compile(cfg: &ConfigFile) -> Self {
        let known = known_extensions(cfg.profiles());

        let profiles: Vec<_> = cfg
            .profiles()
            .iter()
            .filter(|p| p.active)
            .map(|p| Arc::new(RuntimeExportProfile::compile(p, &known)))
            .collect();

        debug!(
            profiles = profiles.len(),
            known_exts = known.len(),
            "compiled rule set"
        );

        let export_formats = cfg
            .settings()
            .export_formats
            .iter()
            .filter_map(|ext| ExportFormat::from_ext(ext))
            .collect();

        Self {
            instant: Arc::new(RuntimeExportProfile::compile(cfg.instant_export(), &known)),
            profiles,
            known_exts: known,
            export_formats,
            track_rename: cfg.settings().track_rename,
            track_delete: cfg.settings().track_delete,
        }
    }

    pub fn profiles(&self) -> &[Arc<RuntimeExportProfile>] {
        &self.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&Arc<RuntimeExportProfile>> {
        self.profiles.iter().find(|p| p.name() == name)
    }

    pub fn known_extensions(&self) -> &KnownExtensions {
        &self.known_exts
    }

    pub fn track_rename(&self) -> bool {
        self.track_rename
    }

    pub fn track_delete(&self) -> bool {
        self.track_delete
    }

    /// Profiles whose predicate accepts `path`, in configuration order.
    pub fn matching(&self, path: &str) -> Vec<Arc<RuntimeExportProfile>> {
        self.profiles
            .iter()
            .filter(|p| p.matches(path))
            .cloned()
            .collect()
    }

    /// The instant-export profile retargeted to `format`, which must be in
    /// the `[settings].export_formats` allow-list.
    pub fn instant_profile(&self, dst_ext: &str) -> Result<RuntimeExportProfile, ExportError> {
        let format = ExportFormat::from_ext(dst_ext)
            .filter(|f| self.export_formats.contains(f))
            .ok_or_else(|| ExportError::UnsupportedFormat(dst_ext.to_string()))?;

        let mut profile = (*self.instant).clone();
        profile.profile.format = format;
        Ok(profile)
    }

    pub fn export_formats(&self) -> &[ExportFormat] {
        &self.export_formats
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Union of every profile's source extensions and target extension,
/// lower-cased. Inactive profiles count too: their old artifacts may
/// still be lying around in the vault.
pub fn known_extensions(profiles: &[ExportProfile]) -> KnownExtensions {
    let mut set = HashSet::new();
    for p in profiles {
        set.extend(p.path.source_exts.iter().map(|e| normalize_ext(e)));
        set.insert(p.format.normalized_ext());
    }
    set.remove("");
    Arc::new(set)
}

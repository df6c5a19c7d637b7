// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{ConfigFile, ExportProfile, RawConfigFile};
use crate::errors::{Result, VaultExportError};
use crate::export::format::ExportFormat;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::VaultExportError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.settings,
            raw.instant_export,
            raw.profiles,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_settings(cfg)?;
    validate_profile_names(cfg)?;
    for profile in cfg.profiles.iter() {
        validate_profile(profile)?;
    }
    validate_profile(&cfg.instant_export)?;
    warn_unsupported_sources(cfg);
    Ok(())
}

fn validate_settings(cfg: &RawConfigFile) -> Result<()> {
    for ext in cfg.settings.export_formats.iter() {
        if ExportFormat::from_ext(ext).is_none() {
            return Err(VaultExportError::ConfigError(format!(
                "[settings].export_formats contains unknown format '{ext}' (expected png, jpg or webp)"
            )));
        }
    }
    Ok(())
}

fn validate_profile_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for profile in cfg.profiles.iter() {
        if profile.name.trim().is_empty() {
            return Err(VaultExportError::ConfigError(
                "every [[profile]] needs a non-empty name".to_string(),
            ));
        }
        if !seen.insert(profile.name.as_str()) {
            return Err(VaultExportError::ConfigError(format!(
                "duplicate profile name '{}'",
                profile.name
            )));
        }
    }
    Ok(())
}

fn validate_profile(profile: &ExportProfile) -> Result<()> {
    let quality = profile.image.quality;
    if !(0.0..=1.0).contains(&quality) {
        return Err(VaultExportError::ConfigError(format!(
            "profile '{}': quality must be within 0..=1 (got {quality})",
            profile.name
        )));
    }

    if profile.format.normalized_ext().is_empty() {
        return Err(VaultExportError::ConfigError(format!(
            "profile '{}': format.ext must not be empty",
            profile.name
        )));
    }

    for (idx, rule) in profile.image.size_adjustments.iter().enumerate() {
        if rule.x.is_none() && rule.y.is_none() {
            return Err(VaultExportError::ConfigError(format!(
                "profile '{}': size rule #{idx} ({:?}) needs at least one of x / y",
                profile.name, rule.kind
            )));
        }
    }

    Ok(())
}

/// Source extensions the engine cannot decode are legal (another engine may
/// be registered) but almost always a mistake.
fn warn_unsupported_sources(cfg: &RawConfigFile) {
    let supported: HashSet<String> = cfg
        .settings
        .supported_formats
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    for profile in cfg.profiles.iter().filter(|p| p.active) {
        for ext in profile.path.source_exts.iter() {
            if !supported.contains(&ext.trim_start_matches('.').to_lowercase()) {
                warn!(
                    profile = %profile.name,
                    ext = %ext,
                    "source extension is not in [settings].supported_formats"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::SizeRule;
    use crate::types::SizeRuleKind;

    fn named(name: &str) -> ExportProfile {
        ExportProfile {
            name: name.to_string(),
            ..ExportProfile::default()
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let raw = RawConfigFile {
            profiles: vec![named("a"), named("a")],
            ..RawConfigFile::default()
        };
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate profile name"));
    }

    #[test]
    fn rejects_quality_out_of_range() {
        let mut p = named("a");
        p.image.quality = 1.5;
        let raw = RawConfigFile {
            profiles: vec![p],
            ..RawConfigFile::default()
        };
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn rejects_size_rule_without_axes() {
        let mut p = named("a");
        p.image.size_adjustments.push(SizeRule {
            kind: SizeRuleKind::Fixed,
            x: None,
            y: None,
        });
        let raw = RawConfigFile {
            profiles: vec![p],
            ..RawConfigFile::default()
        };
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn rejects_unknown_instant_export_format() {
        let mut raw = RawConfigFile::default();
        raw.settings.export_formats.push("bmp".to_string());
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn accepts_empty_config() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert!(cfg.profiles().is_empty());
        assert_eq!(cfg.instant_export().name, "instant export");
    }
}

// src/export/executor.rs

//! Export executor: turns one (source, profile) pair into an artifact on the
//! vault store, and moves/removes artifacts when sources move or vanish.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ExportError;
use crate::export::destination::{DestinationInfo, resolve_destination_info};
use crate::export::engine::{EngineError, EngineRegistry};
use crate::export::path::{SourceParts, resolve_destination};
use crate::fs::VaultFs;
use crate::profile::compiled::{RuleSet, RuntimeExportProfile};

/// Result of a successful export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact was rendered and written.
    Written(String),
    /// The artifact was already current; nothing was touched.
    UpToDate(String),
}

impl ExportOutcome {
    pub fn path(&self) -> &str {
        match self {
            ExportOutcome::Written(p) | ExportOutcome::UpToDate(p) => p,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, ExportOutcome::Written(_))
    }
}

/// Result of relocating an artifact after its source was renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocateOutcome {
    Moved { from: String, to: String },
    /// Nothing at the old artifact path: the source was never exported.
    NothingToMove,
    /// Old and new artifact paths are identical.
    Unchanged,
}

/// Target of an ad-hoc export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Use a configured profile by name.
    Profile(String),
    /// Write to this vault path using the instant-export profile. The
    /// target format comes from the path's extension.
    Destination(String),
}

/// Runs exports against a [`VaultFs`] using engines from an
/// [`EngineRegistry`].
#[derive(Debug, Clone)]
pub struct Exporter {
    fs: Arc<dyn VaultFs>,
    engines: Arc<EngineRegistry>,
}

impl Exporter {
    pub fn new(fs: Arc<dyn VaultFs>, engines: Arc<EngineRegistry>) -> Self {
        Self { fs, engines }
    }

    pub fn fs(&self) -> &Arc<dyn VaultFs> {
        &self.fs
    }

    /// Where `source` lands under `profile` and whether it is current.
    pub fn destination(
        &self,
        source: &str,
        profile: &RuntimeExportProfile,
        override_dst: Option<&str>,
    ) -> Result<DestinationInfo, ExportError> {
        let dst = resolve_destination(source, profile.profile(), override_dst)?;
        let source_modified = self
            .fs
            .modified(source)
            .map_err(|e| read_error(source, e))?
            .ok_or_else(|| ExportError::SourceMissing(source.to_string()))?;

        resolve_destination_info(self.fs.as_ref(), &dst.path, source_modified)
            .map_err(|e| read_error(&dst.path, e))
    }

    /// Export `source` with `profile`.
    ///
    /// Unless `force` is set, a current artifact short-circuits before the
    /// engine is touched.
    pub async fn export(
        &self,
        source: &str,
        profile: &RuntimeExportProfile,
        force: bool,
    ) -> Result<ExportOutcome, ExportError> {
        self.export_to(source, profile, None, force).await
    }

    /// Like [`export`](Self::export) with an optional explicit destination.
    pub async fn export_to(
        &self,
        source: &str,
        profile: &RuntimeExportProfile,
        override_dst: Option<&str>,
        force: bool,
    ) -> Result<ExportOutcome, ExportError> {
        let info = self.destination(source, profile, override_dst)?;
        if !force && info.is_current {
            debug!(source, dst = %info.path, profile = profile.name(), "artifact is current");
            return Ok(ExportOutcome::UpToDate(info.path));
        }

        let ext = SourceParts::split(source).ext;
        let engine = self.engines.get(&ext).map_err(|e| engine_error(source, e))?;
        let bytes = self.fs.read(source).map_err(|e| read_error(source, e))?;

        let transform = profile.size_transform().clone();
        let format = profile.profile().format.clone();
        let quality = profile.profile().image.quality;

        let encoded = tokio::task::spawn_blocking(move || {
            let raster = engine.render(&bytes, &ext, &transform)?;
            engine.encode(raster, &format, quality)
        })
        .await
        .map_err(|e| engine_error(source, EngineError::Task(e.to_string())))?
        .map_err(|e| engine_error(source, e))?;

        self.write_artifact(&info.path, &encoded)?;
        info!(
            source,
            dst = %info.path,
            profile = profile.name(),
            bytes = encoded.len(),
            "exported"
        );
        Ok(ExportOutcome::Written(info.path))
    }

    /// Ad-hoc export of a single file.
    ///
    /// With [`ExportTarget::Profile`] the profile's scope rules are not
    /// checked. With [`ExportTarget::Destination`] the instant-export
    /// profile is used and the destination's extension must be an allowed
    /// export format.
    pub async fn export_now(
        &self,
        source: &str,
        target: &ExportTarget,
        rules: &RuleSet,
        force: bool,
    ) -> Result<ExportOutcome, ExportError> {
        match target {
            ExportTarget::Profile(name) => {
                let profile = rules
                    .profile(name)
                    .ok_or_else(|| ExportError::UnknownProfile(name.clone()))?
                    .clone();
                self.export_to(source, &profile, None, force).await
            }
            ExportTarget::Destination(dst) => {
                let ext = SourceParts::split(dst).ext;
                let profile = rules.instant_profile(&ext)?;
                self.export_to(source, &profile, Some(dst), force).await
            }
        }
    }

    /// Move the artifact at `from` to `to`, creating folders as needed.
    pub fn relocate(&self, from: &str, to: &str) -> Result<RelocateOutcome, ExportError> {
        if from == to {
            return Ok(RelocateOutcome::Unchanged);
        }
        if !self.fs.is_file(from) {
            debug!(from, "no artifact to relocate");
            return Ok(RelocateOutcome::NothingToMove);
        }

        self.ensure_parent(to)?;
        self.fs
            .rename(from, to)
            .map_err(|e| write_error(to, e))?;
        info!(from, to, "relocated artifact");
        Ok(RelocateOutcome::Moved {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Remove the artifact at `path`. Returns `false` if there was none.
    pub fn remove(&self, path: &str) -> Result<bool, ExportError> {
        if !self.fs.is_file(path) {
            return Ok(false);
        }
        self.fs.remove_file(path).map_err(|e| write_error(path, e))?;
        info!(path, "removed artifact");
        Ok(true)
    }

    fn write_artifact(&self, path: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.ensure_parent(path)?;
        self.fs.write(path, bytes).map_err(|e| write_error(path, e))
    }

    fn ensure_parent(&self, path: &str) -> Result<(), ExportError> {
        let dir = SourceParts::split(path).dir;
        if dir.is_empty() || self.fs.exists(&dir) {
            return Ok(());
        }
        self.fs.create_dir_all(&dir).map_err(|e| write_error(&dir, e))
    }
}

fn read_error(path: &str, source: anyhow::Error) -> ExportError {
    ExportError::Read {
        path: path.to_string(),
        source,
    }
}

fn write_error(path: &str, source: anyhow::Error) -> ExportError {
    ExportError::Write {
        path: path.to_string(),
        source,
    }
}

fn engine_error(path: &str, source: EngineError) -> ExportError {
    match source {
        EngineError::UnsupportedTarget(ext) => ExportError::UnsupportedFormat(ext),
        source => ExportError::Engine {
            path: path.to_string(),
            source,
        },
    }
}

// src/export/path.rs

//! Destination path resolution.
//!
//! Pure functions of `(source path, profile snapshot, override)`; no store
//! access happens here.

use crate::config::model::ExportProfile;
use crate::errors::ExportError;
use crate::types::FolderMode;

/// A vault-relative source path split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParts {
    /// Parent folder, `""` at the vault root.
    pub dir: String,
    /// File name including extension.
    pub file_name: String,
    /// File name without the last extension.
    pub stem: String,
    /// Last extension without the dot, original case.
    pub ext: String,
}

impl SourceParts {
    pub fn split(path: &str) -> Self {
        let path = normalize_path(path);
        let (dir, file_name) = match path.rfind('/') {
            Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
            None => (String::new(), path.clone()),
        };
        let (stem, ext) = match file_name.rfind('.') {
            Some(idx) if idx > 0 => (
                file_name[..idx].to_string(),
                file_name[idx + 1..].to_string(),
            ),
            _ => (file_name.clone(), String::new()),
        };
        Self {
            dir,
            file_name,
            stem,
            ext,
        }
    }
}

/// Where an artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    /// Normalised folder, `""` at the vault root.
    pub dir: String,
    pub file_name: String,
    /// `dir/file_name`, normalised. The canonical destination.
    pub path: String,
}

/// Default file name template built from a prefix and suffix:
/// `<prefix.>${name}.${ext}<.suffix>.${dst_ext}`.
pub fn default_template(prefix: &str, suffix: &str) -> String {
    let mut out = String::new();
    if !prefix.is_empty() {
        out.push_str(prefix);
        out.push('.');
    }
    out.push_str("${name}.${ext}");
    if !suffix.is_empty() {
        out.push('.');
        out.push_str(suffix);
    }
    out.push_str(".${dst_ext}");
    out
}

/// The template governing file names for `profile`.
pub fn effective_template(profile: &ExportProfile) -> String {
    match &profile.path.filename_template {
        Some(t) => t.clone(),
        None => default_template(&profile.path.prefix, &profile.path.suffix),
    }
}

/// Compute the destination of `source` under `profile`.
///
/// An `override_dst` wins outright and bypasses every path rule of the
/// profile; its file name must not be blank.
pub fn resolve_destination(
    source: &str,
    profile: &ExportProfile,
    override_dst: Option<&str>,
) -> Result<ResolvedDestination, ExportError> {
    if let Some(dst) = override_dst {
        let normalized = normalize_path(dst);
        let parts = SourceParts::split(&normalized);
        if parts.file_name.trim().is_empty() {
            return Err(ExportError::NoDestinationName(dst.to_string()));
        }
        return Ok(ResolvedDestination {
            dir: parts.dir,
            file_name: parts.file_name,
            path: normalized,
        });
    }

    let src = SourceParts::split(source);
    let template = effective_template(profile);
    let file_name = template
        .replace("${name}", &src.stem)
        .replace("${ext}", &src.ext)
        .replace("${dst_ext}", &profile.format.normalized_ext())
        .trim()
        .to_string();

    if file_name.is_empty() {
        return Err(ExportError::EmptyFileName {
            template,
            source_path: source.to_string(),
        });
    }

    let opts = &profile.path;
    let dir = match opts.folder_mode {
        FolderMode::Relative => join(&src.dir, &opts.dest_dir_rel),
        FolderMode::AbsoluteMirrored => join(&opts.dest_dir_abs, &src.dir),
        FolderMode::Absolute => opts.dest_dir_abs.clone(),
    };
    let dir = normalize_path(&dir);
    let path = normalize_path(&join(&dir, &file_name));

    Ok(ResolvedDestination {
        dir,
        file_name,
        path,
    })
}

fn join(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a}/{b}"),
    }
}

/// Normalise a vault path: `/` and `\` separators, no empty or `.`
/// segments, `..` pops the previous segment (never above the root).
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split(['/', '\\']) {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(mode: FolderMode, rel: &str, abs: &str, suffix: &str) -> ExportProfile {
        let mut p = ExportProfile {
            name: "p".into(),
            ..ExportProfile::default()
        };
        p.path.source_exts = vec!["psd".into()];
        p.path.folder_mode = mode;
        p.path.dest_dir_rel = rel.into();
        p.path.dest_dir_abs = abs.into();
        p.path.suffix = suffix.into();
        p
    }

    #[test]
    fn relative_folder_with_suffix() {
        let p = profile(FolderMode::Relative, "exported", "", "export");
        let dst = resolve_destination("Art/cat.psd", &p, None).unwrap();
        assert_eq!(dst.path, "Art/exported/cat.psd.export.png");
        assert_eq!(dst.dir, "Art/exported");
        assert_eq!(dst.file_name, "cat.psd.export.png");
    }

    #[test]
    fn relative_folder_at_vault_root() {
        let p = profile(FolderMode::Relative, "exported", "", "");
        let dst = resolve_destination("cat.psd", &p, None).unwrap();
        assert_eq!(dst.path, "exported/cat.psd.png");
    }

    #[test]
    fn mirrored_and_flat_absolute_folders() {
        let mirrored = profile(FolderMode::AbsoluteMirrored, "", "out/", "");
        assert_eq!(
            resolve_destination("Art/sub/cat.psd", &mirrored, None).unwrap().path,
            "out/Art/sub/cat.psd.png"
        );

        let flat = profile(FolderMode::Absolute, "ignored", "out", "");
        assert_eq!(
            resolve_destination("Art/sub/cat.psd", &flat, None).unwrap().path,
            "out/cat.psd.png"
        );
    }

    #[test]
    fn prefix_and_custom_template() {
        let mut p = profile(FolderMode::Relative, "", "", "");
        p.path.prefix = "thumb".into();
        assert_eq!(
            resolve_destination("a/b.PSD", &p, None).unwrap().path,
            "a/thumb.b.PSD.png"
        );

        p.path.filename_template = Some("  ${name}-${name}.${dst_ext} ".into());
        assert_eq!(
            resolve_destination("a/b.psd", &p, None).unwrap().path,
            "a/b-b.png"
        );
    }

    #[test]
    fn blank_template_is_an_error() {
        let mut p = profile(FolderMode::Relative, "", "", "");
        p.path.filename_template = Some("   ".into());
        let err = resolve_destination("a/b.psd", &p, None).unwrap_err();
        assert!(matches!(err, ExportError::EmptyFileName { .. }));
    }

    #[test]
    fn override_wins_and_needs_a_name() {
        let p = profile(FolderMode::Absolute, "", "out", "");
        let dst = resolve_destination("a/b.psd", &p, Some("share\\./x.jpg")).unwrap();
        assert_eq!(dst.path, "share/x.jpg");

        let err = resolve_destination("a/b.psd", &p, Some("share/")).unwrap_err();
        assert!(matches!(err, ExportError::NoDestinationName(_)));
    }

    #[test]
    fn dot_dot_segments_are_resolved() {
        let p = profile(FolderMode::Relative, "../exports", "", "");
        assert_eq!(
            resolve_destination("Art/cat.psd", &p, None).unwrap().path,
            "exports/cat.psd.png"
        );
        assert_eq!(normalize_path("../../a//./b"), "a/b");
    }

    #[test]
    fn split_handles_dotfiles_and_extensionless_names() {
        let parts = SourceParts::split("dir/.hidden");
        assert_eq!((parts.stem.as_str(), parts.ext.as_str()), (".hidden", ""));
        let parts = SourceParts::split("x.tar.gz");
        assert_eq!((parts.dir.as_str(), parts.stem.as_str(), parts.ext.as_str()), ("", "x.tar", "gz"));
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the destination directory is derived from the source directory.
///
/// - `Relative`: `<source dir>/<dest_dir_rel>`
/// - `AbsoluteMirrored`: `<dest_dir_abs>/<source dir>`, mirroring the source
///   tree under one root.
/// - `Absolute`: `<dest_dir_abs>`, flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderMode {
    Relative,
    AbsoluteMirrored,
    Absolute,
}

impl Default for FolderMode {
    fn default() -> Self {
        FolderMode::Relative
    }
}

impl FromStr for FolderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relative" => Ok(FolderMode::Relative),
            "absolute_mirrored" | "mirrored" => Ok(FolderMode::AbsoluteMirrored),
            "absolute" => Ok(FolderMode::Absolute),
            other => Err(format!(
                "invalid folder_mode: {other} (expected \"relative\", \"absolute_mirrored\" or \"absolute\")"
            )),
        }
    }
}

/// Kind of a single size adjustment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeRuleKind {
    Fixed,
    Scale,
    Minimum,
    Maximum,
}

impl FromStr for SizeRuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(SizeRuleKind::Fixed),
            "scale" => Ok(SizeRuleKind::Scale),
            "minimum" | "min" => Ok(SizeRuleKind::Minimum),
            "maximum" | "max" => Ok(SizeRuleKind::Maximum),
            other => Err(format!("invalid size rule kind: {other}")),
        }
    }
}

/// Kind of a user text filter on the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFilterKind {
    Includes,
    Excludes,
    RegexMatch,
    RegexNonMatch,
}

impl fmt::Display for TextFilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextFilterKind::Includes => "includes",
            TextFilterKind::Excludes => "excludes",
            TextFilterKind::RegexMatch => "regex_match",
            TextFilterKind::RegexNonMatch => "regex_non_match",
        };
        f.write_str(s)
    }
}

/// Built-in source filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInFilterKind {
    /// Rejects names like `cat.psd.export.png` that carry two or more known
    /// extensions, i.e. files that look like a previous export.
    DoubleExtensionBlocker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_leniently() {
        assert_eq!(" Mirrored ".parse::<FolderMode>(), Ok(FolderMode::AbsoluteMirrored));
        assert_eq!("max".parse::<SizeRuleKind>(), Ok(SizeRuleKind::Maximum));
        assert!("sideways".parse::<FolderMode>().is_err());
    }

    #[test]
    fn folder_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrap {
            mode: FolderMode,
        }
        let w: Wrap = toml::from_str("mode = \"absolute_mirrored\"").unwrap();
        assert_eq!(w.mode, FolderMode::AbsoluteMirrored);
        assert_eq!(TextFilterKind::RegexNonMatch.to_string(), "regex_non_match");
    }
}

// src/export/destination.rs

use std::time::SystemTime;

use anyhow::Result;

use crate::fs::VaultFs;

/// What is currently at an artifact's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationInfo {
    pub path: String,
    /// Modification time of the existing artifact, if any.
    pub existing_modified: Option<SystemTime>,
    /// An artifact exists and is at least as new as the source.
    pub is_current: bool,
}

impl DestinationInfo {
    pub fn exists(&self) -> bool {
        self.existing_modified.is_some()
    }
}

/// Look up `dst_path` and compare it against the source's mtime.
///
/// mtime is the only staleness signal; contents are never compared.
pub fn resolve_destination_info(
    fs: &dyn VaultFs,
    dst_path: &str,
    source_modified: SystemTime,
) -> Result<DestinationInfo> {
    let existing_modified = fs.modified(dst_path)?;
    let is_current = existing_modified.is_some_and(|m| m >= source_modified);
    Ok(DestinationInfo {
        path: dst_path.to_string(),
        existing_modified,
        is_current,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fs::mock::MockVaultFs;

    #[test]
    fn current_iff_artifact_not_older_than_source() -> Result<()> {
        let fs = MockVaultFs::new();
        fs.add_file("a.psd", "src");
        fs.add_file("a.png", "dst");
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(100);

        fs.set_modified("a.png", t);
        assert!(resolve_destination_info(&fs, "a.png", t)?.is_current);

        fs.set_modified("a.png", t - Duration::from_secs(1));
        let info = resolve_destination_info(&fs, "a.png", t)?;
        assert!(info.exists());
        assert!(!info.is_current);
        Ok(())
    }

    #[test]
    fn missing_artifact_is_never_current() -> Result<()> {
        let fs = MockVaultFs::new();
        let info = resolve_destination_info(&fs, "nope.png", SystemTime::UNIX_EPOCH)?;
        assert!(!info.exists());
        assert!(!info.is_current);
        Ok(())
    }
}

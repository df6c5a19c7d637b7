// src/export/format.rs

//! Target formats an artifact can be encoded to.

use serde::{Deserialize, Serialize};

/// Target format of an export: file extension plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ExportFormat {
    pub ext: String,
    #[serde(default)]
    pub mime_type: String,
}

impl ExportFormat {
    pub fn png() -> Self {
        Self::new("png", "image/png")
    }

    pub fn jpg() -> Self {
        Self::new("jpg", "image/jpeg")
    }

    pub fn webp() -> Self {
        Self::new("webp", "image/webp")
    }

    pub fn new(ext: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            ext: ext.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Look up a built-in format by extension (case-insensitive, `jpeg`
    /// is accepted for `jpg`).
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(Self::png()),
            "jpg" | "jpeg" => Some(Self::jpg()),
            "webp" => Some(Self::webp()),
            _ => None,
        }
    }

    /// All built-in formats.
    pub fn builtin() -> Vec<Self> {
        vec![Self::png(), Self::jpg(), Self::webp()]
    }

    pub fn is_builtin(&self) -> bool {
        Self::from_ext(&self.ext).is_some()
    }

    /// Lower-case extension without a leading dot.
    pub fn normalized_ext(&self) -> String {
        self.ext.trim().trim_start_matches('.').to_lowercase()
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::png()
    }
}

// src/export/engine.rs

//! Image engine: decode a source into pixels, apply the compiled size
//! transform, encode into a target format.
//!
//! [`ImageCrateEngine`] is backed by the `image` crate and [`PsdEngine`]
//! reads Photoshop documents with the `psd` crate. Engines are picked by
//! lower-case source extension through an [`EngineRegistry`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::export::format::ExportFormat;
use crate::profile::size::{Size, SizeTransform};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("error while processing the image (via the `image` crate): {0}")]
    Image(#[from] image::ImageError),

    #[error("error while reading the Photoshop document: {0}")]
    Psd(String),

    #[error("no image engine for source extension '{0}'")]
    Unsupported(String),

    #[error("cannot encode to target format '{0}'")]
    UnsupportedTarget(String),

    #[error("image engine task failed: {0}")]
    Task(String),

    #[error("raster buffer of {width}x{height} has {len} bytes")]
    InvalidRaster { width: u32, height: u32, len: usize },
}

/// Decoded RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterBuffer {
    fn from_image(img: DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }

    fn into_image(self) -> Result<RgbaImage, EngineError> {
        let (width, height, len) = (self.width, self.height, self.pixels.len());
        RgbaImage::from_raw(width, height, self.pixels).ok_or(EngineError::InvalidRaster {
            width,
            height,
            len,
        })
    }
}

/// External image engine interface. Implementations are CPU bound and are
/// called from a blocking thread.
pub trait ImageEngine: Send + Sync + Debug {
    /// Decode `bytes` (a file with extension `ext`) and apply `transform`.
    fn render(
        &self,
        bytes: &[u8],
        ext: &str,
        transform: &SizeTransform,
    ) -> Result<RasterBuffer, EngineError>;

    /// Encode `raster` as `format`. `quality` is within `0.0..=1.0`.
    fn encode(
        &self,
        raster: RasterBuffer,
        format: &ExportFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EngineError>;
}

/// Engine backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateEngine;

impl ImageEngine for ImageCrateEngine {
    fn render(
        &self,
        bytes: &[u8],
        ext: &str,
        transform: &SizeTransform,
    ) -> Result<RasterBuffer, EngineError> {
        let img = match ImageFormat::from_extension(ext) {
            Some(format) => image::load_from_memory_with_format(bytes, format)?,
            None => image::load_from_memory(bytes)?,
        };
        Ok(RasterBuffer::from_image(transformed(img, transform)))
    }

    fn encode(
        &self,
        raster: RasterBuffer,
        format: &ExportFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EngineError> {
        let img = raster.into_image()?;
        let mut out = Vec::new();

        match format.normalized_ext().as_str() {
            "png" => {
                DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?
            }
            "webp" => {
                DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut out), ImageFormat::WebP)?
            }
            "jpg" | "jpeg" => {
                let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
                encoder.encode_image(&rgb)?;
            }
            other => return Err(EngineError::UnsupportedTarget(other.to_string())),
        }

        Ok(out)
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Resize and mirror `img` as the size transform asks.
fn transformed(mut img: DynamicImage, transform: &SizeTransform) -> DynamicImage {
    if transform.is_identity() {
        return img;
    }

    let adj = transform.apply(Size::new(img.width() as f64, img.height() as f64));
    let (w, h) = adj.pixel_size();
    if (w, h) != (img.width(), img.height()) {
        debug!(from = ?(img.width(), img.height()), to = ?(w, h), "resizing");
        img = img.resize_exact(w, h, FilterType::Triangle);
    }
    if adj.flip_x() {
        img = img.fliph();
    }
    if adj.flip_y() {
        img = img.flipv();
    }
    img
}

/// Source extensions served by [`PsdEngine`].
pub const PSD_EXTENSIONS: [&str; 2] = ["psd", "psb"];

/// Engine for Photoshop documents. Renders the flattened composite; encoding
/// goes through the `image` crate like every other source.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsdEngine;

impl ImageEngine for PsdEngine {
    fn render(
        &self,
        bytes: &[u8],
        _ext: &str,
        transform: &SizeTransform,
    ) -> Result<RasterBuffer, EngineError> {
        let doc = psd::Psd::from_bytes(bytes).map_err(|e| EngineError::Psd(e.to_string()))?;
        let raster = RasterBuffer {
            width: doc.width(),
            height: doc.height(),
            pixels: doc.rgba(),
        };
        let img = DynamicImage::ImageRgba8(raster.into_image()?);
        Ok(RasterBuffer::from_image(transformed(img, transform)))
    }

    fn encode(
        &self,
        raster: RasterBuffer,
        format: &ExportFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EngineError> {
        ImageCrateEngine.encode(raster, format, quality)
    }
}

/// Engines keyed by lower-case source extension.
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn ImageEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register [`ImageCrateEngine`] for every extension in `exts`.
    pub fn with_image_crate<S: AsRef<str>>(exts: &[S]) -> Self {
        let engine: Arc<dyn ImageEngine> = Arc::new(ImageCrateEngine);
        let mut registry = Self::new();
        for ext in exts {
            registry.register(ext.as_ref(), engine.clone());
        }
        registry
    }

    /// Register an engine for every extension in `exts`: [`PsdEngine`] for
    /// Photoshop documents, [`ImageCrateEngine`] for the rest.
    pub fn with_default_engines<S: AsRef<str>>(exts: &[S]) -> Self {
        let image: Arc<dyn ImageEngine> = Arc::new(ImageCrateEngine);
        let psd: Arc<dyn ImageEngine> = Arc::new(PsdEngine);
        let mut registry = Self::new();
        for ext in exts {
            let ext = normalize(ext.as_ref());
            let engine = if PSD_EXTENSIONS.contains(&ext.as_str()) {
                psd.clone()
            } else {
                image.clone()
            };
            registry.register(&ext, engine);
        }
        registry
    }

    pub fn register(&mut self, ext: &str, engine: Arc<dyn ImageEngine>) {
        self.engines.insert(normalize(ext), engine);
    }

    pub fn get(&self, ext: &str) -> Result<Arc<dyn ImageEngine>, EngineError> {
        self.engines
            .get(&normalize(ext))
            .cloned()
            .ok_or_else(|| EngineError::Unsupported(ext.to_string()))
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.engines.contains_key(&normalize(ext))
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

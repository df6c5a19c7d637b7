use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vaultexport::export::{EngineError, ExportFormat, ImageEngine, RasterBuffer};
use vaultexport::profile::{Size, SizeTransform};

/// An engine that pretends every source is a `width` x `height` image.
///
/// - counts how often `render` was called (shared between clones)
/// - encodes to a small text blob naming the format and final size, so
///   tests can assert on artifact contents without decoding images.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    width: u32,
    height: u32,
    renders: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl ImageEngine for FakeEngine {
    fn render(
        &self,
        _bytes: &[u8],
        _ext: &str,
        transform: &SizeTransform,
    ) -> Result<RasterBuffer, EngineError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let adj = transform.apply(Size::new(self.width as f64, self.height as f64));
        let (width, height) = adj.pixel_size();
        Ok(RasterBuffer {
            width,
            height,
            pixels: Vec::new(),
        })
    }

    fn encode(
        &self,
        raster: RasterBuffer,
        format: &ExportFormat,
        _quality: f32,
    ) -> Result<Vec<u8>, EngineError> {
        Ok(format!("{} {}x{}", format.ext, raster.width, raster.height).into_bytes())
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use pixel_novel::Bitmap;
use tracing::{info, warn};

/// Where the loader thread gets decoded images from.
pub trait ImageSource: Send + Sync {
    fn load_image(&self, path: &str) -> Result<Bitmap, String>;

    /// Warms whatever cache sits behind the source. Default: nothing to warm.
    fn prefetch(&self, _paths: &[String]) {}
}

impl<T: ImageSource + ?Sized> ImageSource for Arc<T> {
    fn load_image(&self, path: &str) -> Result<Bitmap, String> {
        (**self).load_image(path)
    }

    fn prefetch(&self, paths: &[String]) {
        (**self).prefetch(paths)
    }
}

/// In-memory image source for tests and headless runs.
#[derive(Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Bitmap>,
}

impl MemoryImageSource {
    pub fn insert(&mut self, path: impl Into<String>, image: Bitmap) {
        self.images.insert(path.into(), image);
    }

    pub fn with_image(mut self, path: impl Into<String>, image: Bitmap) -> Self {
        self.insert(path, image);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn load_image(&self, path: &str) -> Result<Bitmap, String> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| format!("asset not found: {path}"))
    }
}

impl ImageSource for pixel_novel_assets::AssetStore {
    fn load_image(&self, path: &str) -> Result<Bitmap, String> {
        let image = pixel_novel_assets::AssetStore::load_image(self, path).map_err(|e| e.to_string())?;
        Bitmap::from_rgba(image.width, image.height, image.pixels)
            .ok_or_else(|| format!("decoded buffer size mismatch for {path}"))
    }

    fn prefetch(&self, paths: &[String]) {
        let report = self.install(paths);
        for failure in &report.failures {
            warn!(path = %failure.path, "offline cache miss: {}", failure.error);
        }
        info!(
            cached = report.cached.len(),
            bytes = report.bytes,
            "offline cache installed"
        );
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

// Global Image ID generator
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    label: String,
    pixels: RgbaImage,
}

/// A decoded, ready-to-draw raster image.
///
/// Cheap to clone: every clone shares the same read-only pixel buffer, so the
/// director and any number of falling objects can hold the same handle.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Image {
    #[must_use]
    pub fn new(label: impl Into<String>, pixels: RgbaImage) -> Self {
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            pixels,
        }))
    }

    /// Convenience constructor for a uniformly colored image.
    #[must_use]
    pub fn solid(label: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(label, RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Natural width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.pixels.width()
    }

    /// Natural height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.pixels.height()
    }

    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.0.pixels
    }
}

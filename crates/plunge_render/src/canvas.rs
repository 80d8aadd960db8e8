//! Software Canvas
//!
//! [`Canvas`] is a CPU implementation of [`Surface`] backed by an
//! [`RgbaImage`]. It is what the engine renders into when no host surface is
//! supplied, and what every pixel-level test inspects.
//!
//! # Rasterization
//!
//! Shapes are rasterized by inverse mapping: for each device pixel inside the
//! transformed shape's bounding box, the pixel center is mapped back into
//! local space through the inverse of the current [`Affine2`] and tested
//! against the local rectangle. Images are sampled nearest-neighbour. Every
//! write is composited source-over, with the source alpha multiplied by the
//! current global alpha.

use std::path::Path;

use glam::{Affine2, Vec2};
use image::{ImageFormat, ImageResult, Rgba, RgbaImage};
use plunge_core::{Color, Image, PixelSnapshot, Surface, SurfaceError};

// ============================================================================
// Draw State
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine2,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            alpha: 1.0,
        }
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// An in-memory RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Canvas {
    /// A fully transparent canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// A canvas pre-filled with `color`.
    #[must_use]
    pub fn with_background(width: u32, height: u32, color: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color.to_array())),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// The pixel at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// The current local-to-device transform.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> Affine2 {
        self.state.transform
    }

    #[inline]
    #[must_use]
    pub fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    /// Depth of the save/restore stack.
    #[inline]
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Writes the current frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.pixels.save_with_format(path, ImageFormat::Png)
    }

    /// Rasterizes the local rectangle `(x, y, w, h)`, calling `shade` with the
    /// local-space offset into the rectangle for every covered pixel.
    fn raster_rect<F>(&mut self, x: f32, y: f32, w: f32, h: f32, mut shade: F)
    where
        F: FnMut(Vec2) -> Option<[u8; 4]>,
    {
        if w <= 0.0 || h <= 0.0 || self.state.alpha <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        if transform.matrix2.determinant().abs() <= f32::EPSILON {
            return;
        }
        let inverse = transform.inverse();

        let corners = [
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x, y + h),
            Vec2::new(x + w, y + h),
        ]
        .map(|c| transform.transform_point2(c));

        let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |m, c| m.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |m, c| m.max(*c));

        let (width, height) = self.pixels.dimensions();
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(height);

        let alpha = self.state.alpha;
        for py in y0..y1 {
            for px in x0..x1 {
                let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let local = inverse.transform_point2(center);
                let offset = local - Vec2::new(x, y);
                if offset.x < 0.0 || offset.y < 0.0 || offset.x >= w || offset.y >= h {
                    continue;
                }
                if let Some(src) = shade(offset) {
                    blend_over(self.pixels.get_pixel_mut(px, py), src, alpha);
                }
            }
        }
    }
}

/// Source-over compositing of `src` (scaled by `alpha`) onto `dst`.
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4], alpha: f32) {
    let sa = f32::from(src[3]) / 255.0 * alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        *dst = Rgba(src);
        return;
    }

    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let s = f32::from(src[c]);
        let d = f32::from(dst[c]);
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
        self.state = DrawState::default();
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            log::warn!("Canvas::restore called without a matching save");
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let rgba = color.to_array();
        self.raster_rect(x, y, width, height, |_| Some(rgba));
    }

    fn draw_image(&mut self, image: &Image, x: f32, y: f32) {
        let source = image.pixels();
        let (iw, ih) = source.dimensions();
        if iw == 0 || ih == 0 {
            return;
        }
        self.raster_rect(x, y, iw as f32, ih as f32, |offset| {
            let u = (offset.x as u32).min(iw - 1);
            let v = (offset.y as u32).min(ih - 1);
            Some(source.get_pixel(u, v).0)
        });
    }

    fn get_image_data(&self) -> Result<PixelSnapshot, SurfaceError> {
        Ok(PixelSnapshot::new(self.pixels.clone()))
    }

    fn put_image_data(
        &mut self,
        snapshot: &PixelSnapshot,
        x: i32,
        y: i32,
    ) -> Result<(), SurfaceError> {
        let (width, height) = self.pixels.dimensions();
        let fits = x >= 0
            && y >= 0
            && i64::from(x) + i64::from(snapshot.width()) <= i64::from(width)
            && i64::from(y) + i64::from(snapshot.height()) <= i64::from(height);
        if !fits {
            return Err(SurfaceError::SnapshotMismatch {
                expected: (width, height),
                actual: snapshot.size(),
            });
        }

        let (ox, oy) = (x as u32, y as u32);
        for (sx, sy, pixel) in snapshot.pixels().enumerate_pixels() {
            self.pixels.put_pixel(ox + sx, oy + sy, *pixel);
        }
        Ok(())
    }

    fn reset_transform(&mut self) {
        self.state.transform = Affine2::IDENTITY;
    }
}

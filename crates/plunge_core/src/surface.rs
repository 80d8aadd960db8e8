//! Drawing Surface Seam
//!
//! The engine never rasterizes anything itself. Everything it draws goes
//! through [`Surface`], a 2D immediate-mode API modelled on a canvas context:
//! affine transforms with a save/restore stack, a global alpha, rectangle
//! fills, image blits and full-surface pixel snapshots.
//!
//! Snapshot operations ([`Surface::get_image_data`] / [`Surface::put_image_data`])
//! bypass the transform and alpha state entirely; a snapshot written back at
//! the origin reproduces the captured pixels verbatim.

use image::RgbaImage;

use crate::color::Color;
use crate::errors::SurfaceError;
use crate::image::Image;

/// A full-surface copy of the pixels, as returned by [`Surface::get_image_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSnapshot {
    pixels: RgbaImage,
}

impl PixelSnapshot {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
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
}

/// The 2D drawing API the engine renders through.
///
/// Transform calls compose onto the current transform in the order they are
/// made, exactly like a canvas context: `translate` then `rotate` rotates
/// around the translated origin.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Resizes the surface, discarding its contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Pushes the current transform and global alpha.
    fn save(&mut self);

    /// Pops the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);

    /// Rotates clockwise (y axis pointing down) by `radians`.
    fn rotate(&mut self, radians: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    /// Sets the opacity multiplier applied to every subsequent draw.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Fills an axis-aligned rectangle in local (transformed) coordinates.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Draws `image` with its top-left corner at `(x, y)` in local coordinates,
    /// at its natural pixel size.
    fn draw_image(&mut self, image: &Image, x: f32, y: f32);

    /// Reads back every pixel of the surface.
    fn get_image_data(&self) -> Result<PixelSnapshot, SurfaceError>;

    /// Writes a snapshot back with its top-left corner at device pixel `(x, y)`.
    fn put_image_data(&mut self, snapshot: &PixelSnapshot, x: i32, y: i32)
    -> Result<(), SurfaceError>;

    /// Fills the whole surface with `color`, ignoring the current transform.
    fn clear(&mut self, color: Color) {
        let (width, height) = (self.width() as f32, self.height() as f32);
        self.save();
        self.reset_transform();
        self.set_global_alpha(1.0);
        self.fill_rect(0.0, 0.0, width, height, color);
        self.restore();
    }

    /// Replaces the current transform with the identity.
    fn reset_transform(&mut self);
}

/// Runs `f` between [`Surface::save`] and [`Surface::restore`], so transform
/// and alpha changes made inside never leak to the next caller.
pub fn with_saved_state<S, F, R>(surface: &mut S, f: F) -> R
where
    S: Surface + ?Sized,
    F: FnOnce(&mut S) -> R,
{
    surface.save();
    let out = f(surface);
    surface.restore();
    out
}

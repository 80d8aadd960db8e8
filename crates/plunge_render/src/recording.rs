use std::cell::Cell;

use plunge_core::{Color, Image, PixelSnapshot, Surface, SurfaceError};

/// Per-operation counters collected by [`RecordingSurface`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceOps {
    pub draw_image: u64,
    pub fill_rect: u64,
    pub get_image_data: u64,
    pub put_image_data: u64,
    pub save: u64,
    pub restore: u64,
}

/// Wraps a surface and counts the operations issued against it.
///
/// Snapshot read-back can be switched off with
/// [`fail_read_back`](Self::fail_read_back) to exercise error recovery.
#[derive(Debug, Clone)]
pub struct RecordingSurface<S> {
    inner: S,
    ops: SurfaceOps,
    reads: Cell<u64>,
    drawn: Vec<u64>,
    read_back_disabled: bool,
}

impl<S: Surface> RecordingSurface<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ops: SurfaceOps::default(),
            reads: Cell::new(0),
            drawn: Vec::new(),
            read_back_disabled: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn ops(&self) -> SurfaceOps {
        SurfaceOps {
            get_image_data: self.reads.get(),
            ..self.ops
        }
    }

    /// Image ids passed to `draw_image`, in call order.
    #[must_use]
    pub fn drawn_images(&self) -> &[u64] {
        &self.drawn
    }

    /// Resets every counter and the drawn-image log.
    pub fn reset(&mut self) {
        self.ops = SurfaceOps::default();
        self.reads.set(0);
        self.drawn.clear();
    }

    /// Makes `get_image_data` fail from now on.
    pub fn fail_read_back(&mut self, disabled: bool) {
        self.read_back_disabled = disabled;
    }

    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Surface> Surface for RecordingSurface<S> {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.inner.resize(width, height);
    }

    fn save(&mut self) {
        self.ops.save += 1;
        self.inner.save();
    }

    fn restore(&mut self) {
        self.ops.restore += 1;
        self.inner.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.inner.translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.inner.rotate(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.inner.scale(sx, sy);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.inner.set_global_alpha(alpha);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.ops.fill_rect += 1;
        self.inner.fill_rect(x, y, width, height, color);
    }

    fn draw_image(&mut self, image: &Image, x: f32, y: f32) {
        self.ops.draw_image += 1;
        self.drawn.push(image.id());
        self.inner.draw_image(image, x, y);
    }

    fn get_image_data(&self) -> Result<PixelSnapshot, SurfaceError> {
        self.reads.set(self.reads.get() + 1);
        if self.read_back_disabled {
            return Err(SurfaceError::ReadBackUnavailable(
                "read-back disabled on this recording surface".to_string(),
            ));
        }
        self.inner.get_image_data()
    }

    fn put_image_data(
        &mut self,
        snapshot: &PixelSnapshot,
        x: i32,
        y: i32,
    ) -> Result<(), SurfaceError> {
        self.ops.put_image_data += 1;
        self.inner.put_image_data(snapshot, x, y)
    }

    fn reset_transform(&mut self) {
        self.inner.reset_transform();
    }
}

//! Plunge Render
//!
//! Concrete [`Surface`](plunge_core::Surface) implementations.
//!
//! - [`Canvas`]: software raster into an RGBA buffer
//! - [`RecordingSurface`]: wraps another surface and counts its operations

pub mod canvas;
pub mod recording;

pub use canvas::Canvas;
pub use recording::{RecordingSurface, SurfaceOps};

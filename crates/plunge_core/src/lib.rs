//! Plunge Core
//!
//! Foundational types shared by every Plunge crate:
//!
//! - [`errors`]: the engine-wide [`Error`] type and [`Result`] alias
//! - [`color`]: RGBA [`Color`] with hex parsing
//! - [`image`]: shared, read-only [`Image`] handles
//! - [`surface`]: the [`Surface`] drawing seam and [`PixelSnapshot`]
//! - [`time`]: monotonic [`Clock`]s
//! - [`signal`]: the [`Signal`] publish/subscribe channel

pub mod color;
pub mod errors;
pub mod image;
pub mod signal;
pub mod surface;
pub mod time;

pub use color::Color;
pub use errors::{AssetError, Error, Result, SurfaceError};
pub use self::image::Image;
pub use signal::{Signal, SubscriptionId};
pub use surface::{PixelSnapshot, Surface, with_saved_state};
pub use time::{Clock, ManualClock, SystemClock};

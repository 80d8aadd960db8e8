//! Plunge Assets
//!
//! Turns image locators into decoded [`Image`](plunge_core::Image) handles.
//!
//! - [`ImageSource`]: where an image comes from (path, URL, data URI, bytes)
//! - [`ImageLoader`]: loads every source on worker threads and reports
//!   completions as they arrive
//! - [`ReadyLatch`]: opens exactly once after the last load completes
//! - [`LoadPolicy`]: fail the session or skip broken sources

pub mod latch;
pub mod loader;
pub mod source;

pub use latch::ReadyLatch;
pub use loader::{DEFAULT_LOAD_TIMEOUT, ImageLoader, LoadPolicy, load_images};
pub use source::{ImageSource, decode_data_uri, decode_image};

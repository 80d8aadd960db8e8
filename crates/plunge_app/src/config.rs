//! Engine Configuration
//!
//! [`EngineConfig`] carries every option the engine recognises. It is plain
//! data, deserializable from JSON, and every field except `images` has a
//! default:
//!
//! ```json
//! {
//!     "images": ["a.png", "https://example.com/b.jpg"],
//!     "spawn_interval_ms": 4000,
//!     "background_color": "#000000"
//! }
//! ```
//!
//! Values are checked once by [`EngineConfig::validate`], which the engine
//! builder calls before anything is loaded or drawn.

use std::time::Duration;

use plunge_animation::{
    Border, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH, DEFAULT_FALL_DURATION,
    DEFAULT_SCALE_FRACTION,
};
use plunge_assets::{DEFAULT_LOAD_TIMEOUT, ImageSource, LoadPolicy};
use plunge_core::{Color, Error, Result};
use serde::Deserialize;

pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 4000;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
pub const DEFAULT_SPAWN_MARGIN: f32 = 50.0;

/// Attribute defaults applied to every spawned object.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObjectDefaults {
    /// Fraction of the start size lost by the end of the fall.
    pub scale_fraction: f32,
    pub border: bool,
    pub border_color: Color,
    pub border_width: f32,
}

impl Default for ObjectDefaults {
    fn default() -> Self {
        Self {
            scale_fraction: DEFAULT_SCALE_FRACTION,
            border: true,
            border_color: DEFAULT_BORDER_COLOR,
            border_width: DEFAULT_BORDER_WIDTH,
        }
    }
}

impl ObjectDefaults {
    /// The border these defaults describe, if enabled.
    #[must_use]
    pub fn border(&self) -> Option<Border> {
        self.border.then_some(Border {
            color: self.border_color,
            width: self.border_width,
        })
    }
}

/// Engine options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered image sources. At least one is required.
    pub images: Vec<ImageSource>,
    /// Pick images uniformly at random instead of round-robin.
    pub randomize_order: bool,
    pub spawn_interval_ms: u64,
    pub fall_duration_ms: u64,
    pub background_color: Color,
    /// Keep spawn centers inside the surface, inset by `spawn_margin`.
    pub constrain_to_surface: bool,
    /// Resize the surface to the host viewport at setup.
    pub fill_to_window: bool,
    /// Requested; the effective value also depends on the image sources.
    pub use_key_frame_cache: bool,
    pub spawn_margin: f32,
    pub tick_interval_ms: u64,
    pub object_defaults: ObjectDefaults,
    pub load_timeout_ms: u64,
    pub load_policy: LoadPolicy,
    /// Fixed seed for reproducible spawns.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            randomize_order: true,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            fall_duration_ms: DEFAULT_FALL_DURATION.as_millis() as u64,
            background_color: Color::BLACK,
            constrain_to_surface: true,
            fill_to_window: false,
            use_key_frame_cache: true,
            spawn_margin: DEFAULT_SPAWN_MARGIN,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            object_defaults: ObjectDefaults::default(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT.as_millis() as u64,
            load_policy: LoadPolicy::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Default options over the given image sources.
    #[must_use]
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ImageSource>,
    {
        Self {
            images: images.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::NoImages);
        }
        for (name, value) in [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("fall_duration_ms", self.fall_duration_ms),
            ("tick_interval_ms", self.tick_interval_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("`{name}` must be positive")));
            }
        }
        if !(0.0..=1.0).contains(&self.object_defaults.scale_fraction) {
            return Err(Error::InvalidConfig(format!(
                "`object_defaults.scale_fraction` must be within [0, 1], got {}",
                self.object_defaults.scale_fraction
            )));
        }
        if !self.object_defaults.border_width.is_finite() || self.object_defaults.border_width < 0.0
        {
            return Err(Error::InvalidConfig(
                "`object_defaults.border_width` must be a non-negative number".to_string(),
            ));
        }
        if !self.spawn_margin.is_finite() || self.spawn_margin < 0.0 {
            return Err(Error::InvalidConfig(
                "`spawn_margin` must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    #[inline]
    #[must_use]
    pub fn fall_duration(&self) -> Duration {
        Duration::from_millis(self.fall_duration_ms)
    }

    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[inline]
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// `true` if any source is fetched from another origin.
    #[must_use]
    pub fn has_remote_sources(&self) -> bool {
        self.images.iter().any(ImageSource::is_remote)
    }

    /// Whether the key-frame cache can run: requested, and no source is
    /// remote (remote pixels cannot be read back).
    #[must_use]
    pub fn key_frame_cache_enabled(&self) -> bool {
        self.use_key_frame_cache && !self.has_remote_sources()
    }
}

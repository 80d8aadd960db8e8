//! Scene Director
//!
//! The [`Director`] owns the [`ObjectRegistry`], decides when to spawn, and
//! renders each tick through a [`Surface`].
//!
//! # Tick Pipeline
//!
//! ```text
//! spawn? ──▶ clear ──▶ bake newly settled objects (if pending) ──▶ draw the rest ──▶ detect landings
//!              │                        │                                               │
//!   replay key-frame or fill    capture key-frame                             mark key-frame pending
//! ```
//!
//! # Key-Frame Cache
//!
//! The key-frame holds the background plus a prefix of the registry: the
//! longest run of objects, in draw order, that have all landed. Landed objects
//! never change, so replaying the key-frame and drawing everything after the
//! prefix yields the same pixels as drawing every started object from scratch.
//!
//! An object that lands while an earlier object is still falling stays out of
//! the key-frame and is redrawn each tick until everything before it has
//! landed too. Otherwise it would end up beneath objects that are drawn
//! after it.
//!
//! Landing detection runs after the draws, so a landing object is drawn once
//! at its resting pose before the following tick bakes it.
//!
//! If reading or writing the snapshot ever fails, the key-frame is dropped
//! and the cache stays off for the rest of the session: every tick then
//! fills the background and redraws every started object, which produces the
//! same picture at a higher cost.

use std::time::Duration;

use plunge_animation::{Border, FallingObject, LandedEvent};
use plunge_core::{Color, Error, Image, PixelSnapshot, Result, Surface, SurfaceError};
use plunge_scene::{ObjectKey, ObjectRegistry};

use crate::config::{EngineConfig, ObjectDefaults};
use crate::spawn::SpawnPolicy;

/// What happened during one [`Director::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// A new object was spawned.
    pub spawned: bool,
    /// A key-frame was captured during the tick.
    pub snapshot_captured: bool,
    /// The surface was cleared by replaying the key-frame rather than a fill.
    pub replayed: bool,
    /// Objects drawn, including those baked into a new key-frame.
    pub drawn: usize,
    /// Objects that landed during the tick.
    pub landings: usize,
}

/// Per-attribute overrides for [`Director::add_object`].
///
/// Unset attributes fall back to the values a regular spawn would pick.
#[derive(Debug, Clone, Default)]
pub struct ObjectOverrides {
    /// Index into the loaded images.
    pub image_index: Option<usize>,
    /// An image that was not part of the loaded set. Wins over `image_index`.
    pub image: Option<Image>,
    pub start_width: Option<f32>,
    pub start_height: Option<f32>,
    pub x_pos: Option<f32>,
    pub y_pos: Option<f32>,
    pub end_rotation: Option<f32>,
    pub scale_fraction: Option<f32>,
    pub fall_duration: Option<Duration>,
    /// `Some(None)` removes the border.
    pub border: Option<Option<Border>>,
    pub auto_start: Option<bool>,
}

pub struct Director {
    registry: ObjectRegistry,
    images: Vec<Image>,
    spawn_policy: SpawnPolicy,

    spawn_interval: Duration,
    fall_duration: Duration,
    background: Color,
    constrain_to_surface: bool,
    spawn_margin: f32,
    object_defaults: ObjectDefaults,

    cache_enabled: bool,
    key_frame: Option<PixelSnapshot>,
    /// Number of leading registry objects contained in `key_frame`.
    baked: usize,
    pending_snapshot: bool,
    last_spawn_at: Duration,
    landings: flume::Receiver<LandedEvent>,
}

impl Director {
    /// Creates a director over the loaded `images`. The spawn interval is
    /// measured from `now`.
    pub fn new(config: &EngineConfig, images: Vec<Image>, now: Duration) -> Result<Self> {
        if images.is_empty() {
            return Err(Error::NoImages);
        }

        let mut registry = ObjectRegistry::new();
        let (sender, landings) = flume::unbounded();
        registry.on_landing(move |event| {
            let _ = sender.send(*event);
        });

        let cache_enabled = config.key_frame_cache_enabled();
        if config.use_key_frame_cache && !cache_enabled {
            log::info!("Key-frame cache disabled: at least one image source is remote");
        }

        Ok(Self {
            registry,
            images,
            spawn_policy: SpawnPolicy::new(config.randomize_order, config.rng_seed),
            spawn_interval: config.spawn_interval(),
            fall_duration: config.fall_duration(),
            background: config.background_color,
            constrain_to_surface: config.constrain_to_surface,
            spawn_margin: config.spawn_margin,
            object_defaults: config.object_defaults,
            cache_enabled,
            key_frame: None,
            baked: 0,
            pending_snapshot: false,
            last_spawn_at: now,
            landings,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    #[inline]
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    #[must_use]
    pub fn spawn_policy(&self) -> &SpawnPolicy {
        &self.spawn_policy
    }

    /// Whether the key-frame cache is active. Turns off permanently after a
    /// snapshot error.
    #[inline]
    #[must_use]
    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    #[inline]
    #[must_use]
    pub fn key_frame(&self) -> Option<&PixelSnapshot> {
        self.key_frame.as_ref()
    }

    /// How many objects, counted from the start of the registry, the
    /// key-frame already contains.
    #[inline]
    #[must_use]
    pub fn baked_count(&self) -> usize {
        self.baked
    }

    #[inline]
    #[must_use]
    pub fn is_snapshot_pending(&self) -> bool {
        self.pending_snapshot
    }

    #[inline]
    #[must_use]
    pub fn last_spawn_at(&self) -> Duration {
        self.last_spawn_at
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Paints the background and restarts the spawn interval from `now`.
    pub fn start<S: Surface + ?Sized>(&mut self, surface: &mut S, now: Duration) {
        surface.clear(self.background);
        self.last_spawn_at = now;
    }

    /// Drops the key-frame after the surface changed size. The next tick
    /// rebuilds it from the landed objects at the new size.
    pub fn invalidate_key_frame(&mut self) {
        self.key_frame = None;
        self.baked = 0;
        self.pending_snapshot = self.cache_enabled;
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Spawns one object with a policy-chosen image and a random placement.
    pub fn spawn(&mut self, surface_width: u32, surface_height: u32, now: Duration) -> ObjectKey {
        let key = self.insert(ObjectOverrides::default(), surface_width, surface_height, now);
        self.last_spawn_at = now;
        key
    }

    /// Adds an object outside the spawn schedule. Does not reset the spawn
    /// interval.
    pub fn add_object(
        &mut self,
        overrides: ObjectOverrides,
        surface_width: u32,
        surface_height: u32,
        now: Duration,
    ) -> Result<ObjectKey> {
        if overrides.image.is_none()
            && let Some(index) = overrides.image_index
            && index >= self.images.len()
        {
            return Err(Error::InvalidConfig(format!(
                "image index {index} out of range ({} images loaded)",
                self.images.len()
            )));
        }
        Ok(self.insert(overrides, surface_width, surface_height, now))
    }

    fn insert(
        &mut self,
        overrides: ObjectOverrides,
        surface_width: u32,
        surface_height: u32,
        now: Duration,
    ) -> ObjectKey {
        let image = match (overrides.image, overrides.image_index) {
            (Some(image), _) => image,
            (None, Some(index)) => self.images[index].clone(),
            (None, None) => {
                let index = self.spawn_policy.next_index(self.images.len()).unwrap_or(0);
                self.images[index].clone()
            }
        };

        let (x, y) = match (overrides.x_pos, overrides.y_pos) {
            (Some(x), Some(y)) => (x, y),
            (x, y) => {
                let (rx, ry) = self.spawn_policy.position(
                    surface_width as f32,
                    surface_height as f32,
                    self.spawn_margin,
                    self.constrain_to_surface,
                );
                (x.unwrap_or(rx), y.unwrap_or(ry))
            }
        };
        let end_rotation = overrides
            .end_rotation
            .unwrap_or_else(|| self.spawn_policy.end_rotation());

        let mut builder = FallingObject::builder(image)
            .position(x, y)
            .end_rotation(end_rotation)
            .scale_fraction(
                overrides
                    .scale_fraction
                    .unwrap_or(self.object_defaults.scale_fraction),
            )
            .fall_duration(overrides.fall_duration.unwrap_or(self.fall_duration))
            .border(
                overrides
                    .border
                    .unwrap_or_else(|| self.object_defaults.border()),
            )
            .auto_start(overrides.auto_start.unwrap_or(true));
        if let Some(width) = overrides.start_width {
            builder = builder.start_width(width);
        }
        if let Some(height) = overrides.start_height {
            builder = builder.start_height(height);
        }

        let object = builder.build(now);
        log::debug!(
            "Spawned object {} showing '{}' at ({x:.0}, {y:.0}), rotation {end_rotation:.3}",
            object.id(),
            object.image().label()
        );
        self.registry.add(object)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs one update-and-render cycle at `now`.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, now: Duration) -> TickStats {
        let mut stats = TickStats::default();

        // 1. Spawn
        if now.saturating_sub(self.last_spawn_at) > self.spawn_interval {
            self.spawn(surface.width(), surface.height(), now);
            stats.spawned = true;
        }

        // 2. Clear
        let mut next = 0;
        let replay = self
            .key_frame
            .as_ref()
            .map(|frame| surface.put_image_data(frame, 0, 0));
        match replay {
            Some(Ok(())) => {
                stats.replayed = true;
                next = self.baked;
            }
            Some(Err(err)) => self.disable_cache(&err),
            None => {}
        }
        if !stats.replayed {
            surface.clear(self.background);
        }

        // 3. Bake objects that joined the settled prefix
        if self.cache_enabled && self.pending_snapshot {
            self.pending_snapshot = false;
            let settled: Vec<&FallingObject> = self
                .registry
                .iter()
                .skip(next)
                .take_while(|object| object.is_landed())
                .collect();
            if !settled.is_empty() {
                for object in &settled {
                    object.draw(surface, now);
                }
                stats.drawn += settled.len();
                next += settled.len();

                match surface.get_image_data() {
                    Ok(snapshot) => {
                        log::trace!(
                            "Captured key-frame {}x{} holding {next} objects",
                            snapshot.width(),
                            snapshot.height()
                        );
                        self.key_frame = Some(snapshot);
                        self.baked = next;
                        stats.snapshot_captured = true;
                    }
                    Err(err) => self.disable_cache(&err),
                }
            }
        }

        // 4. Draw everything after the key-frame
        for object in self.registry.iter().skip(next) {
            if object.is_started() {
                object.draw(surface, now);
                stats.drawn += 1;
            }
        }

        // 5. Landing detection
        self.registry.update(now);
        for _ in self.landings.try_iter() {
            stats.landings += 1;
            self.pending_snapshot = self.cache_enabled;
        }

        stats
    }

    fn disable_cache(&mut self, err: &SurfaceError) {
        log::warn!("Key-frame cache disabled for this session: {err}");
        self.cache_enabled = false;
        self.key_frame = None;
        self.baked = 0;
        self.pending_snapshot = false;
    }
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("objects", &self.registry.len())
            .field("images", &self.images.len())
            .field("cache_enabled", &self.cache_enabled)
            .field("has_key_frame", &self.key_frame.is_some())
            .field("baked", &self.baked)
            .field("pending_snapshot", &self.pending_snapshot)
            .field("last_spawn_at", &self.last_spawn_at)
            .finish_non_exhaustive()
    }
}

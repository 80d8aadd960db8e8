//! Engine Lifecycle
//!
//! Setup is split in two so image loading never blocks configuration errors:
//!
//! 1. [`EngineBuilder::build`] validates the configuration and takes the
//!    drawing surface. Every configuration error surfaces here.
//! 2. [`Launcher::load`] loads every image, then runs the `on_ready`
//!    callbacks exactly once with the finished [`Engine`].
//!
//! # Example
//!
//! ```rust,ignore
//! use plunge::prelude::*;
//!
//! let config = EngineConfig::new(["a.png", "b.png"]);
//! let mut engine = EngineBuilder::new(config)
//!     .surface(Canvas::new(800, 600))
//!     .build()?
//!     .on_ready(|engine| engine.start())
//!     .load()?;
//!
//! engine.run(Some(200), |_surface, _frame| {});
//! ```

use std::time::Duration;

use plunge_assets::ImageLoader;
use plunge_core::{Clock, Error, Result, Surface, SystemClock};
use plunge_scene::{ObjectKey, ObjectRegistry};

use crate::config::EngineConfig;
use crate::director::{Director, ObjectOverrides, TickStats};
use crate::ticker::Ticker;

type ReadyCallback<S> = Box<dyn FnOnce(&mut Engine<S>)>;

/// Passed to the per-frame callback of [`Engine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    /// 1-based frame number.
    pub frame: u64,
    /// Clock time the frame was rendered at.
    pub now: Duration,
    pub stats: TickStats,
}

// ============================================================================
// Builder
// ============================================================================

/// Collects the surface, viewport and clock for an engine.
pub struct EngineBuilder<S> {
    config: EngineConfig,
    surface: Option<S>,
    viewport: Option<(u32, u32)>,
    clock: Option<Box<dyn Clock>>,
}

impl<S: Surface> EngineBuilder<S> {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            surface: None,
            viewport: None,
            clock: None,
        }
    }

    /// The surface every frame is drawn into. Required.
    #[must_use]
    pub fn surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Host viewport size, used when `fill_to_window` is set.
    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    /// Time source. Defaults to [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Validates the configuration and prepares the surface.
    pub fn build(self) -> Result<Launcher<S>> {
        self.config.validate()?;
        let mut surface = self.surface.ok_or(Error::MissingSurface)?;

        if self.config.fill_to_window {
            match self.viewport {
                Some((width, height)) => {
                    log::debug!("Resizing surface to viewport {width}x{height}");
                    surface.resize(width, height);
                }
                None => log::warn!("`fill_to_window` is set but no viewport was given"),
            }
        }

        Ok(Launcher {
            config: self.config,
            surface,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            ready: Vec::new(),
        })
    }
}

// ============================================================================
// Launcher
// ============================================================================

/// A validated engine waiting for its images.
pub struct Launcher<S> {
    config: EngineConfig,
    surface: S,
    clock: Box<dyn Clock>,
    ready: Vec<ReadyCallback<S>>,
}

impl<S: Surface> Launcher<S> {
    /// Registers a callback to run once every image has loaded. Callbacks
    /// run in registration order.
    #[must_use]
    pub fn on_ready<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Engine<S>) + 'static,
    {
        self.ready.push(Box::new(callback));
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads every image, builds the engine and fires the ready callbacks.
    ///
    /// Blocks for at most `load_timeout_ms`. Load failures are handled
    /// according to `load_policy`.
    pub fn load(self) -> Result<Engine<S>> {
        let Self {
            config,
            surface,
            clock,
            ready,
        } = self;

        let mut loader = ImageLoader::spawn(&config.images);
        loader.wait(config.load_timeout());
        let images = loader.finish(config.load_policy)?;
        log::info!("{} of {} image(s) ready", images.len(), config.images.len());

        let director = Director::new(&config, images, clock.now())?;
        let mut engine = Engine {
            config,
            surface,
            clock,
            director,
            started: false,
            frame_count: 0,
        };

        for callback in ready {
            callback(&mut engine);
        }
        Ok(engine)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A running animation: the director, its surface and its clock.
pub struct Engine<S> {
    config: EngineConfig,
    surface: S,
    clock: Box<dyn Clock>,
    director: Director,
    started: bool,
    frame_count: u64,
}

impl<S: Surface> Engine<S> {
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    #[inline]
    #[must_use]
    pub fn director(&self) -> &Director {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut Director {
        &mut self.director
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        self.director.registry()
    }

    /// Current clock time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of pulses rendered since [`start`](Self::start).
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Arms the loop and paints the background. Later calls are ignored.
    pub fn start(&mut self) {
        if self.started {
            log::debug!("Engine::start called twice; ignoring");
            return;
        }
        let now = self.clock.now();
        self.director.start(&mut self.surface, now);
        self.started = true;
        log::info!(
            "Engine started on a {}x{} surface",
            self.surface.width(),
            self.surface.height()
        );
    }

    /// Runs one tick at the current clock time. Does nothing before
    /// [`start`](Self::start).
    pub fn pulse(&mut self) -> TickStats {
        if !self.started {
            log::trace!("Engine::pulse before start; skipping");
            return TickStats::default();
        }
        let now = self.clock.now();
        self.frame_count += 1;
        self.director.tick(&mut self.surface, now)
    }

    /// Pulses at `tick_interval_ms` until `max_frames` frames have been
    /// rendered (forever when `None`), calling `on_frame` after each one.
    pub fn run<F>(&mut self, max_frames: Option<u64>, mut on_frame: F)
    where
        F: FnMut(&S, FrameState),
    {
        let _ = env_logger::try_init();
        if !self.started {
            self.start();
        }

        let mut ticker = Ticker::new(self.config.tick_interval());
        let mut rendered = 0u64;
        while max_frames.is_none_or(|max| rendered < max) {
            ticker.wait();
            let now = self.clock.now();
            let stats = self.pulse();
            rendered += 1;
            on_frame(
                &self.surface,
                FrameState {
                    frame: self.frame_count,
                    now,
                    stats,
                },
            );
        }
        log::debug!(
            "Run finished after {rendered} frame(s), {} pulse(s) skipped",
            ticker.skipped
        );
    }

    /// Adds an object outside the spawn schedule, armed at the current time
    /// unless `auto_start` is overridden.
    pub fn add_object(&mut self, overrides: ObjectOverrides) -> Result<ObjectKey> {
        let now = self.clock.now();
        let (width, height) = (self.surface.width(), self.surface.height());
        self.director.add_object(overrides, width, height, now)
    }

    /// Resizes the surface and repaints from scratch.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.director.invalidate_key_frame();
        self.surface.clear(self.director.background());
    }
}

impl<S> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("director", &self.director)
            .field("started", &self.started)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # Plunge
//!
//! A small real-time 2D engine that drops images onto a drawing surface.
//! Each image falls for a fixed duration, shrinking, rotating and fading in,
//! then comes to rest. Settled images are kept in a key-frame snapshot so
//! only the objects still in motion are redrawn each tick.
//!
//! This crate re-exports the workspace crates under one roof; most programs
//! only need the [`prelude`].

pub use plunge_core::{color, errors, signal, surface, time};

pub use plunge_animation as animation;
pub use plunge_app as app;
pub use plunge_assets as assets;
pub use plunge_render as render;
pub use plunge_scene as scene;

pub use plunge_animation::{FallPose, FallState, FallingObject, LandedEvent, ObjectId};
pub use plunge_app::{
    Director, Engine, EngineBuilder, EngineConfig, FrameState, Launcher, ObjectOverrides,
    TickStats,
};
pub use plunge_assets::{ImageSource, LoadPolicy};
pub use plunge_core::{
    AssetError, Clock, Color, Error, Image, ManualClock, PixelSnapshot, Result, Surface,
    SurfaceError, SystemClock,
};
pub use plunge_render::{Canvas, RecordingSurface};
pub use plunge_scene::{ObjectKey, ObjectRegistry};

pub mod prelude {
    //! The types needed to configure, load and run an engine.

    pub use plunge_animation::{Border, FallingObject};
    pub use plunge_app::{Engine, EngineBuilder, EngineConfig, ObjectOverrides, TickStats};
    pub use plunge_assets::{ImageSource, LoadPolicy};
    pub use plunge_core::{Clock, Color, Image, ManualClock, Surface, SystemClock};
    pub use plunge_render::Canvas;
}

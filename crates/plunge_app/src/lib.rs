//! Plunge App
//!
//! Everything above a single falling object:
//!
//! - [`config`]: [`EngineConfig`] and its defaults
//! - [`spawn`]: image selection and random placement
//! - [`director`]: the per-tick spawn, key-frame and draw pipeline
//! - [`engine`]: builder, launcher and the running [`Engine`]
//! - [`ticker`]: fixed-cadence pulses for [`Engine::run`]

pub mod config;
pub mod director;
pub mod engine;
pub mod spawn;
pub mod ticker;

pub use config::{
    DEFAULT_SPAWN_INTERVAL_MS, DEFAULT_SPAWN_MARGIN, DEFAULT_TICK_INTERVAL_MS, EngineConfig,
    ObjectDefaults,
};
pub use director::{Director, ObjectOverrides, TickStats};
pub use engine::{Engine, EngineBuilder, FrameState, Launcher};
pub use spawn::SpawnPolicy;
pub use ticker::Ticker;

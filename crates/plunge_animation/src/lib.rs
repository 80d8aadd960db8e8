//! Plunge Animation
//!
//! The per-object motion state machine: [`FallingObject`] converts elapsed
//! clock time into a [`FallPose`] and reports its landing exactly once.

pub mod falling;

pub use falling::{
    Border, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH, DEFAULT_FALL_DURATION,
    DEFAULT_SCALE_FRACTION, FallPose, FallState, FallingObject, FallingObjectBuilder, LandedEvent,
    ObjectId, Strip, fall_fraction,
};

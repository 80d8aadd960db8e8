//! Plunge Scene
//!
//! [`ObjectRegistry`] owns every falling object for its lifetime and answers
//! the per-tick queries the director needs (moving, stopped, started).

pub mod registry;

pub use registry::{ObjectKey, ObjectRegistry};

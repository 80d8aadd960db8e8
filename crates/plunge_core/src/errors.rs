//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure mode the engine reports:
//! - Configuration errors, surfaced at setup before anything runs
//! - Asset loading and decoding errors ([`AssetError`])
//! - Drawing surface errors ([`SurfaceError`]), which the director recovers from
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use plunge_core::errors::{Error, Result};
//!
//! fn validate() -> Result<()> {
//!     Err(Error::NoImages)
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// The main error type for the Plunge engine.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// No drawing surface was handed to the engine builder.
    #[error("No drawing surface configured: call `EngineBuilder::surface` before `build`")]
    MissingSurface,

    /// The image list is empty.
    #[error("At least one image source is required")]
    NoImages,

    /// A color string could not be parsed.
    #[error("Invalid color '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// An image source failed to load.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    // ========================================================================
    // Surface Errors
    // ========================================================================
    /// The drawing surface rejected an operation.
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Failures while acquiring an image.
#[derive(Error, Debug)]
pub enum AssetError {
    /// File I/O error.
    #[error("IO error reading '{source_name}': {error}")]
    Io {
        /// The source locator being read
        source_name: String,
        /// The underlying I/O error
        error: std::io::Error,
    },

    /// The bytes could not be decoded as an image.
    #[error("Failed to decode image '{source_name}': {message}")]
    Decode {
        /// The source locator being decoded
        source_name: String,
        /// Decoder message
        message: String,
    },

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// HTTP request error.
    #[error("HTTP error for '{url}': {message}")]
    Http {
        /// The requested URL
        url: String,
        /// Transport or status message
        message: String,
    },

    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),

    /// The load did not complete before the ready deadline.
    #[error("Timed out after {timeout:?} waiting for '{source_name}'")]
    Timeout {
        /// The source locator still pending at the deadline
        source_name: String,
        /// The configured deadline
        timeout: Duration,
    },

    /// The loader worker vanished without reporting a result.
    #[error("Loader for '{0}' exited without a result")]
    WorkerLost(String),
}

/// Failures reported by a [`Surface`](crate::surface::Surface).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// A pixel snapshot does not match the surface dimensions.
    #[error("Snapshot is {actual:?} but the surface is {expected:?}")]
    SnapshotMismatch {
        /// Surface size `(width, height)`
        expected: (u32, u32),
        /// Snapshot size `(width, height)`
        actual: (u32, u32),
    },

    /// Pixel data cannot be read back from the surface.
    #[error("Pixel read-back is not available: {0}")]
    ReadBackUnavailable(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

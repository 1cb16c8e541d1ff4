//! Error types raised across the input pipeline.

use thiserror::Error;

use crate::surface::SurfaceError;

/// Errors that cross the input source or coordinator boundary.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input source is not attached to a surface")]
    NotAttached,

    #[error("input source has been disposed")]
    Disposed,

    #[error("touch {0} is not active")]
    UnknownTouch(i32),

    #[error("no events to play back")]
    NoPlaybackEvents,

    #[error("failed to initialize input coordinator: {0}")]
    Initialization(String),

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

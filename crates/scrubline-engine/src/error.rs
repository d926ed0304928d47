#![forbid(unsafe_code)]

//! Engine error types.
//!
//! Nothing here is fatal. A rejected clip leaves the previous clip loaded;
//! a failed frame leaves its slot empty until the next request pass.

use std::fmt;

/// Reasons a clip load or layout pass is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipError {
    /// Duration is zero, negative, or not finite.
    InvalidDuration(f64),
    /// Viewport leaves no room for the filmstrip.
    InvalidViewport { width: f64, height: f64 },
    /// The clip's natural frame size is empty or not finite.
    InvalidThumbnailSize,
}

/// Why a frame provider could not produce an image for one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Outstanding requests were cancelled (clip reload).
    Cancelled,
    /// The decoder failed.
    Decode(String),
    /// The timestamp lies outside the media.
    OutOfRange(f64),
}

impl fmt::Display for ClipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration(d) => write!(f, "invalid clip duration: {d}"),
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport: {width}x{height}")
            }
            Self::InvalidThumbnailSize => write!(f, "invalid thumbnail size"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "frame request cancelled"),
            Self::Decode(msg) => write!(f, "frame decode failed: {msg}"),
            Self::OutOfRange(t) => write!(f, "frame time out of range: {t}"),
        }
    }
}

impl std::error::Error for ClipError {}
impl std::error::Error for FrameError {}

#![forbid(unsafe_code)]

//! Scrubline error model and graceful degradation.
//!
//! Every subsystem keeps its own typed error: [`ClipError`] for rejected
//! clips and viewports, [`FrameError`] for failed thumbnail decodes, and
//! [`ConfigError`] for configuration loading. [`Error`] unifies them for
//! hosts that want a single `?`-able type, and [`Error::degradation`] says
//! how the scrubber keeps going afterwards.

use std::fmt;

pub use scrubline_engine::{ClipError, FrameError};
pub use scrubline_runtime::ConfigError;

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for Scrubline hosts.
#[derive(Debug)]
pub enum Error {
    /// A clip load or layout pass was rejected.
    Clip(ClipError),
    /// The frame provider could not produce a thumbnail.
    Frame(FrameError),
    /// Configuration could not be read or failed validation.
    Config(ConfigError),
}

/// Standard result type for Scrubline APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the scrubber does in place of the failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// The load is rejected; the previous clip and layout stay in effect.
    RejectLoad,
    /// The thumbnail slot stays empty until the next request pass.
    KeepEmpty,
    /// Run with [`ScrubberConfig::default`](scrubline_runtime::ScrubberConfig).
    UseDefaults,
}

impl Error {
    /// Determine the degradation action for this error.
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Clip(_) => DegradationAction::RejectLoad,
            Self::Frame(_) => DegradationAction::KeepEmpty,
            Self::Config(_) => DegradationAction::UseDefaults,
        }
    }

    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Clip(_) => "clip",
            Self::Frame(_) => "frame",
            Self::Config(_) => "config",
        }
    }

    /// Whether the scrubber keeps its current state without host action.
    ///
    /// A configuration error needs the host to choose a fallback.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::UseDefaults)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clip(err) => write!(f, "{err}"),
            Self::Frame(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Clip(err) => Some(err),
            Self::Frame(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<ClipError> for Error {
    fn from(err: ClipError) -> Self {
        Self::Clip(err)
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

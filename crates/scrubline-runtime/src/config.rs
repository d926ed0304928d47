#![forbid(unsafe_code)]

//! Policy-as-data configuration for the scrubber engine.
//!
//! Every tunable constant of the interaction engine lives in one
//! [`ScrubberConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # scrubline.toml
//! min_separation = 0.25
//! passthrough = false
//! loop_playback = true
//! ```
//!
//! ```rust,ignore
//! let config = ScrubberConfig::from_toml_file("scrubline.toml")?;
//! let config = ScrubberConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `ScrubberConfig::default()` reproduces the stock scrubber behavior.
//! Missing keys in a loaded file fall back to these defaults.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Tunable parameters of the scrubber.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScrubberConfig {
    /// Minimum distance between the trim knobs, in seconds.
    pub min_separation: f64,
    /// Whether the knobs may cross each other (swapping start/end roles).
    pub passthrough: bool,
    /// Width of a knob handle in screen pixels.
    pub knob_width: f64,
    /// Width of the edge-scroll zone at each viewport edge, in pixels.
    pub edge_width: f64,
    /// Content pixels scrolled per second per pixel of edge strength.
    pub edge_scroll_gain: f64,
    /// Seconds of clip covered by one thumbnail height at the finest zoom.
    pub duration_per_height: f64,
    /// Fraction of the viewport the fully zoomed-out clip should fill.
    pub min_width_ratio: f64,
    /// A ready thumbnail is stale once its fetch tolerance exceeds the
    /// current tolerance by this factor.
    pub stale_factor: f64,
    /// Frame tolerance (seconds) used before the first layout.
    pub initial_tolerance: f64,
    /// Provider output size relative to the drawn thumbnail size.
    pub thumbnail_oversample: f64,
    /// Snap animation after a pinch, in milliseconds.
    pub pinch_settle_ms: u64,
    /// Knob correction and seek animations, in milliseconds.
    pub trim_settle_ms: u64,
    /// Animation and edge-scroll tick, in milliseconds.
    pub tick_interval_ms: u64,
    /// Playback poll tick, in milliseconds.
    pub poll_interval_ms: u64,
    /// Loop back to the trim start when playback reaches the trim end.
    pub loop_playback: bool,
    /// Initial end knob time, clamped to the clip duration.
    pub default_trim_end: f64,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            min_separation: 0.1,
            passthrough: true,
            knob_width: 20.0,
            edge_width: 40.0,
            edge_scroll_gain: 5.0,
            duration_per_height: 0.35,
            min_width_ratio: 0.8,
            stale_factor: 1.2,
            initial_tolerance: 10.0,
            thumbnail_oversample: 1.5,
            pinch_settle_ms: 100,
            trim_settle_ms: 200,
            tick_interval_ms: 10,
            poll_interval_ms: 10,
            loop_playback: false,
            default_trim_end: 3.0,
        }
    }
}

impl ScrubberConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let positive = [
            ("min_separation", self.min_separation),
            ("knob_width", self.knob_width),
            ("duration_per_height", self.duration_per_height),
            ("stale_factor", self.stale_factor),
            ("initial_tolerance", self.initial_tolerance),
            ("thumbnail_oversample", self.thumbnail_oversample),
            ("default_trim_end", self.default_trim_end),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        }

        if !self.edge_width.is_finite() || self.edge_width < 0.0 {
            errors.push(format!("edge_width must be >= 0, got {}", self.edge_width));
        }
        if !self.edge_scroll_gain.is_finite() || self.edge_scroll_gain < 0.0 {
            errors.push(format!(
                "edge_scroll_gain must be >= 0, got {}",
                self.edge_scroll_gain
            ));
        }
        if !(self.min_width_ratio > 0.0 && self.min_width_ratio <= 1.0) {
            errors.push(format!(
                "min_width_ratio must be in (0, 1], got {}",
                self.min_width_ratio
            ));
        }
        if self.stale_factor.is_finite() && self.stale_factor < 1.0 {
            errors.push(format!(
                "stale_factor must be >= 1 to avoid refetch loops, got {}",
                self.stale_factor
            ));
        }
        if self.tick_interval_ms == 0 {
            errors.push("tick_interval_ms must be > 0".into());
        }
        if self.poll_interval_ms == 0 {
            errors.push("poll_interval_ms must be > 0".into());
        }

        if !errors.is_empty() {
            tracing::warn!(count = errors.len(), "invalid scrubber config");
        }
        errors
    }

    /// Validate, returning the config on success.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn pinch_settle(&self) -> Duration {
        Duration::from_millis(self.pinch_settle_ms)
    }

    #[must_use]
    pub fn trim_settle(&self) -> Duration {
        Duration::from_millis(self.trim_settle_ms)
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a scrubber configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ScrubberConfig::default().validate().is_empty());
    }

    #[test]
    fn default_values() {
        let c = ScrubberConfig::default();
        assert_eq!(c.min_separation, 0.1);
        assert!(c.passthrough);
        assert_eq!(c.edge_width, 40.0);
        assert_eq!(c.stale_factor, 1.2);
        assert_eq!(c.pinch_settle(), Duration::from_millis(100));
        assert_eq!(c.trim_settle(), Duration::from_millis(200));
        assert_eq!(c.poll_interval(), Duration::from_millis(10));
    }

    #[test]
    fn validation_reports_each_problem() {
        let c = ScrubberConfig {
            min_separation: 0.0,
            min_width_ratio: 1.5,
            tick_interval_ms: 0,
            edge_scroll_gain: f64::NAN,
            ..ScrubberConfig::default()
        };
        let errors = c.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("min_separation")));
        assert!(errors.iter().any(|e| e.contains("min_width_ratio")));
    }

    #[test]
    fn stale_factor_below_one_rejected() {
        let c = ScrubberConfig {
            stale_factor: 0.9,
            ..ScrubberConfig::default()
        };
        assert!(matches!(c.validated(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validation_error_display() {
        let e = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(e.to_string(), "validation errors: a; b");
        assert!(std::error::Error::source(&e).is_none());
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_uses_defaults() {
        let c = ScrubberConfig::from_toml_str("passthrough = false\nmin_separation = 0.5\n").unwrap();
        assert!(!c.passthrough);
        assert_eq!(c.min_separation, 0.5);
        assert_eq!(c.edge_width, 40.0);
    }

    #[cfg(feature = "config")]
    #[test]
    fn malformed_json_is_reported() {
        let err = ScrubberConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("JSON parse error"));
    }
}

#![forbid(unsafe_code)]

//! Fixed-duration interpolation between two values.
//!
//! # Invariants
//!
//! 1. `current()` equals `from` before the first tick and `to` once
//!    complete, exactly (no float drift at the end).
//! 2. Elapsed time never exceeds the duration.
//!
//! # Failure Modes
//!
//! - Zero duration: the tween is complete immediately and reports `to`.

use std::time::Duration;

use super::{Animation, ease_out};

/// Interpolates `from → to` over `duration` along an ease-out curve.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    /// Create an ease-out tween.
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> f64 {
        self.from
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> f64 {
        self.to
    }

    #[inline]
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Interpolated value at the current elapsed time.
    #[must_use]
    pub fn current(&self) -> f64 {
        if self.is_complete() {
            return self.to;
        }
        self.from + (self.to - self.from) * f64::from(self.value())
    }

    /// Jump straight to the end state.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        ease_out(t)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#![forbid(unsafe_code)]

//! Animation primitives: the ease-out curve and value tweens.
//!
//! The core never renders. An [`Animation`] only answers "how far along am
//! I" for a given amount of elapsed time; a [`Tween`] maps that progress onto
//! a concrete `from → to` value range (a content width, a scroll offset, a
//! knob time). Hosts tick animations from their own frame clock and read the
//! values back.

mod tween;

use std::time::Duration;

pub use tween::Tween;

/// A time-driven animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Eased progress in `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Quadratic ease-out.
#[inline]
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#![forbid(unsafe_code)]

//! Two-pointer pinch zoom.
//!
//! # State Machine
//!
//! `Idle → Pinching → Settling → Idle`. A pinch starts once two pointers
//! move, follows them until one lifts, then eases the content width onto
//! the nearest rung of the zoom ladder.
//!
//! # Invariants
//!
//! 1. The content width stays inside `[min_width, max_width]` at every step.
//! 2. While pinching, the content fraction under the pinch midpoint is the
//!    one that was under it when the pinch started.
//! 3. Settling always ends on a snapped width.

use std::f64::consts::TAU;
use std::time::Duration;

use scrubline_core::animation::{Animation, Tween};
use scrubline_core::geometry::{Point, TimeSpace, snap_width};
use scrubline_runtime::ScrubberConfig;
use tracing::debug;

/// Width for a pinch that started at `start_width` and is now at `scale`.
///
/// Below `min_width` the width pins to the floor and above `max_width` to
/// the ceiling. In between, a small oscillating correction makes the zoom
/// resist near power-of-two widths.
#[must_use]
pub fn pinch_width(start_width: f64, scale: f64, min_width: f64, max_width: f64) -> f64 {
    let raw = start_width * scale;
    if raw.is_nan() || raw < min_width {
        return min_width;
    }
    if raw > max_width {
        return max_width;
    }
    let ratio = raw / max_width;
    let notch = (2.0 / ratio).log2();
    let effect = ((TAU * notch).sin() * 0.108 - (3.0 * TAU * notch).sin() * 0.009) * ratio;
    (max_width * (ratio + effect)).max(min_width).min(max_width)
}

/// State captured when a pinch begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub start_distance: f64,
    pub start_width: f64,
    /// Fraction of the content under the pinch midpoint.
    pub focal_ratio: f64,
    /// Most recent midpoint of the two pointers.
    pub midpoint: Point,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Pinching(PinchGesture),
    Settling { width: Tween, offset: Tween },
}

/// Drives the content width from pinch gestures.
#[derive(Debug, Clone)]
pub struct ZoomController {
    phase: Phase,
    settle: Duration,
}

impl ZoomController {
    #[must_use]
    pub fn new(config: &ScrubberConfig) -> Self {
        Self {
            phase: Phase::Idle,
            settle: config.pinch_settle(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_pinching(&self) -> bool {
        matches!(self.phase, Phase::Pinching(_))
    }

    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    #[must_use]
    pub fn gesture(&self) -> Option<&PinchGesture> {
        match &self.phase {
            Phase::Pinching(gesture) => Some(gesture),
            _ => None,
        }
    }

    /// Begin a pinch between `a` and `b`. Abandons any settle in progress.
    pub fn start(&mut self, a: Point, b: Point, space: &TimeSpace) {
        let midpoint = a.midpoint(b);
        let start_width = space.width();
        let origin = space.viewport_width() / 2.0 - space.scroll_offset();
        let focal_ratio = if start_width > 0.0 {
            (midpoint.x - origin) / start_width
        } else {
            0.0
        };
        let gesture = PinchGesture {
            start_distance: a.distance(b).max(f64::EPSILON),
            start_width,
            focal_ratio,
            midpoint,
        };
        debug!(width = start_width, focal = focal_ratio, "pinch started");
        self.phase = Phase::Pinching(gesture);
    }

    /// Follow the pointers. Returns `false` when no pinch is active.
    pub fn update(&mut self, a: Point, b: Point, space: &mut TimeSpace) -> bool {
        let Phase::Pinching(gesture) = &mut self.phase else {
            return false;
        };
        let midpoint = a.midpoint(b);
        gesture.midpoint = midpoint;
        let scale = a.distance(b) / gesture.start_distance;
        let content = space.content();
        let width = pinch_width(
            gesture.start_width,
            scale,
            content.min_width(),
            content.max_width(),
        );
        space.set_width(width);
        let origin = midpoint.x - space.width() * gesture.focal_ratio;
        space.set_scroll_offset(space.viewport_width() / 2.0 - origin);
        true
    }

    /// Release the pinch and start settling onto the snapped width.
    ///
    /// The settle keeps the content under the last pinch midpoint in place.
    /// Returns the snapped target width.
    pub fn end(&mut self, space: &TimeSpace) -> Option<f64> {
        let Phase::Pinching(gesture) = self.phase else {
            return None;
        };
        let content = space.content();
        let width = space.width();
        let snapped = snap_width(width, content.max_width())
            .max(content.min_width())
            .min(content.max_width());

        let mid = gesture.midpoint.x;
        let half = space.viewport_width() / 2.0;
        let focal = if width > 0.0 {
            (mid - (half - space.scroll_offset())) / width
        } else {
            0.0
        };
        let target_offset = (half - (mid - snapped * focal)).max(0.0).min(snapped);

        debug!(from = width, to = snapped, "pinch ended");
        self.phase = Phase::Settling {
            width: Tween::new(width, snapped, self.settle),
            offset: Tween::new(space.scroll_offset(), target_offset, self.settle),
        };
        Some(snapped)
    }

    /// Advance the settle animation. Returns `true` while it is still running.
    pub fn tick(&mut self, dt: Duration, space: &mut TimeSpace) -> bool {
        let Phase::Settling { width, offset } = &mut self.phase else {
            return false;
        };
        width.tick(dt);
        offset.tick(dt);
        space.set_width(width.current());
        space.set_scroll_offset(offset.current());
        if width.is_complete() && offset.is_complete() {
            self.phase = Phase::Idle;
            return false;
        }
        true
    }

    /// Drop any pinch or settle without touching the space.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubline_core::geometry::{ContentSpace, Viewport};

    fn space() -> TimeSpace {
        TimeSpace::new(
            10.0,
            ContentSpace::new(400.0, 100.0, 800.0),
            Viewport {
                scroll_offset: 200.0,
                width: 320.0,
                height: 60.0,
            },
        )
    }

    fn zoom() -> ZoomController {
        ZoomController::new(&ScrubberConfig::default())
    }

    #[test]
    fn focal_ratio_from_midpoint() {
        let mut z = zoom();
        z.start(Point::new(100.0, 0.0), Point::new(220.0, 0.0), &space());
        let g = z.gesture().unwrap();
        assert_eq!(g.start_distance, 120.0);
        assert_eq!(g.focal_ratio, 0.5);
    }

    #[test]
    fn spreading_keeps_focal_point_under_midpoint() {
        let mut s = space();
        let mut z = zoom();
        z.start(Point::new(100.0, 0.0), Point::new(220.0, 0.0), &s);
        assert!(z.update(Point::new(40.0, 0.0), Point::new(280.0, 0.0), &mut s));
        assert!((s.width() - 800.0).abs() < 1e-6);
        assert!((s.scroll_offset() - 400.0).abs() < 1e-6);
    }

    #[test]
    fn collapsing_pins_to_min() {
        let mut s = space();
        let mut z = zoom();
        z.start(Point::new(100.0, 0.0), Point::new(220.0, 0.0), &s);
        z.update(Point::new(159.5, 0.0), Point::new(160.5, 0.0), &mut s);
        assert_eq!(s.width(), 100.0);
        assert_eq!(s.scroll_offset(), 50.0);
    }

    #[test]
    fn end_settles_on_snapped_width() {
        let mut s = space();
        let mut z = zoom();
        z.start(Point::new(100.0, 0.0), Point::new(220.0, 0.0), &s);
        z.update(Point::new(115.0, 0.0), Point::new(205.0, 0.0), &mut s);
        assert!(s.width() > 300.0 && s.width() < 330.0);
        assert_eq!(z.end(&s), Some(400.0));
        assert!(z.is_settling());
        assert!(z.tick(Duration::from_millis(50), &mut s));
        assert!(!z.tick(Duration::from_millis(60), &mut s));
        assert_eq!(s.width(), 400.0);
        assert!(!z.is_settling());
    }

    #[test]
    fn update_without_pinch_is_ignored() {
        let mut s = space();
        let mut z = zoom();
        assert!(!z.update(Point::new(0.0, 0.0), Point::new(10.0, 0.0), &mut s));
        assert_eq!(z.end(&s), None);
        assert_eq!(s.width(), 400.0);
    }

    #[test]
    fn pinch_width_notches_vanish_on_ladder() {
        let w = pinch_width(400.0, 1.0, 100.0, 800.0);
        assert!((w - 400.0).abs() < 1e-6);
    }
}

#![forbid(unsafe_code)]

//! Time, content, and screen coordinate spaces.
//!
//! Three spaces describe the scrubber:
//!
//! - **Time**: seconds in `[0, duration]`.
//! - **Content**: logical pixels along the whole clip, `[0, width]`, where
//!   `width` is the current zoomed content width.
//! - **Screen**: pixels in the visible viewport. The playhead sits at the
//!   viewport center, so content position `scroll_offset` is drawn at
//!   `viewport_width / 2`.
//!
//! # Invariants
//!
//! 1. `0 ≤ min_width ≤ width ≤ max_width` after every setter.
//! 2. `0 ≤ scroll_offset ≤ width` after every setter.
//! 3. `content_to_time(time_to_content(t)) == t` (within float tolerance)
//!    whenever `duration > 0` and `width > 0`.
//! 4. [`snap_width`] always returns `max / 2^n` for an integer `n ≥ 0`.
//!
//! # Failure Modes
//!
//! - Zero, negative, or non-finite duration: every conversion that divides
//!   by the duration returns `0.0`. Loading such a clip is rejected upstream.
//! - Zero content width: content → time conversions return `0.0`.

/// Largest power-of-two exponent the zoom ladder descends to.
const MAX_SNAP_EXPONENT: f64 = 52.0;

/// Round to the nearest integer, with exact halves rounding up.
#[inline]
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Quantize `candidate` onto the geometric ladder `max / 2^n`, `n ≥ 0`.
///
/// `n = log2(max / candidate)` is rounded to the nearest integer (ties round
/// up) and clamped to `n ≥ 0`, so the result never exceeds `max`. Snapping is
/// idempotent: a ladder width maps to itself.
///
/// A non-positive `max` yields `0.0`. A non-positive or non-finite
/// `candidate` lands on the finest rung the ladder supports.
#[must_use]
pub fn snap_width(candidate: f64, max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 || max.is_infinite() {
        return 0.0;
    }
    let exponent = if candidate > 0.0 && candidate.is_finite() {
        round_half_up((max / candidate).log2()).clamp(0.0, MAX_SNAP_EXPONENT)
    } else {
        MAX_SNAP_EXPONENT
    };
    max / 2f64.powf(exponent)
}

// ---------------------------------------------------------------------------
// Points and sizes
// ---------------------------------------------------------------------------

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scale to `height`, keeping the aspect ratio.
    ///
    /// A degenerate size (zero height) scales to a square.
    #[must_use]
    pub fn fit_height(&self, height: f64) -> Size {
        if self.height.abs() <= f64::EPSILON {
            return Size::new(height, height);
        }
        let ratio = self.width.abs() / self.height.abs();
        Size::new(height * ratio, height)
    }

    /// Multiply both dimensions by `factor`.
    #[inline]
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    /// Check if either dimension is zero or negative.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width.is_nan() || self.height.is_nan() || self.width <= 0.0 || self.height <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Content space and viewport
// ---------------------------------------------------------------------------

/// Logical scrollable extent representing the whole clip at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentSpace {
    width: f64,
    min_width: f64,
    max_width: f64,
}

impl ContentSpace {
    /// Create a content space; bounds are ordered and `width` clamped into them.
    #[must_use]
    pub fn new(width: f64, min_width: f64, max_width: f64) -> Self {
        let mut space = Self::default();
        space.set_bounds(min_width, max_width);
        space.set_width(width);
        space
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn min_width(&self) -> f64 {
        self.min_width
    }

    #[inline]
    #[must_use]
    pub const fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Set the zoom bounds and re-clamp the current width.
    pub fn set_bounds(&mut self, min_width: f64, max_width: f64) {
        let max_width = max_width.max(0.0);
        self.max_width = max_width;
        self.min_width = min_width.clamp(0.0, max_width);
        self.width = self.width.clamp(self.min_width, self.max_width);
    }

    /// Set the content width, clamped to `[min_width, max_width]`.
    pub fn set_width(&mut self, width: f64) {
        let width = if width.is_finite() { width } else { self.max_width };
        self.width = width.clamp(self.min_width, self.max_width);
    }
}

/// The visible window into content space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Content position under the viewport center (the playhead).
    pub scroll_offset: f64,
    /// Viewport width in screen pixels.
    pub width: f64,
    /// Viewport height in screen pixels.
    pub height: f64,
}

// ---------------------------------------------------------------------------
// TimeSpace
// ---------------------------------------------------------------------------

/// The single shared mapping between time, content, and screen space.
///
/// All conversions are pure functions of `{duration, width, scroll_offset,
/// viewport_width}`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeSpace {
    duration: f64,
    content: ContentSpace,
    viewport: Viewport,
}

impl TimeSpace {
    /// Create a time space for a clip of `duration` seconds.
    #[must_use]
    pub fn new(duration: f64, content: ContentSpace, viewport: Viewport) -> Self {
        let mut space = Self {
            duration: 0.0,
            content,
            viewport,
        };
        space.set_duration(duration);
        space.set_scroll_offset(viewport.scroll_offset);
        space
    }

    #[inline]
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether conversions are enabled (finite, positive duration).
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.duration > 0.0 && self.duration.is_finite()
    }

    #[inline]
    #[must_use]
    pub const fn content(&self) -> &ContentSpace {
        &self.content
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.content.width()
    }

    #[inline]
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset
    }

    #[inline]
    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport.width
    }

    /// Replace the clip duration. Invalid durations disable conversions.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
    }

    /// Replace the zoom bounds; width and offset are re-clamped.
    pub fn set_bounds(&mut self, min_width: f64, max_width: f64) {
        self.content.set_bounds(min_width, max_width);
        self.clamp_offset();
    }

    /// Set the content width without moving the scroll offset (beyond clamping).
    pub fn set_width(&mut self, width: f64) {
        self.content.set_width(width);
        self.clamp_offset();
    }

    /// Set the content width, keeping the playhead on the same time.
    pub fn set_width_keeping_time(&mut self, width: f64) {
        let ratio = self.playhead_ratio();
        self.content.set_width(width);
        self.viewport.scroll_offset = ratio * self.content.width();
        self.clamp_offset();
    }

    /// Set the scroll offset, clamped to `[0, width]`.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.viewport.scroll_offset = if offset.is_finite() { offset } else { 0.0 };
        self.clamp_offset();
    }

    /// Update the viewport size delivered by the host layout pass.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width.max(0.0);
        self.viewport.height = height.max(0.0);
    }

    fn clamp_offset(&mut self) {
        self.viewport.scroll_offset = self.viewport.scroll_offset.clamp(0.0, self.content.width());
    }

    /// Fraction of the content under the playhead, in `[0, 1]`.
    #[must_use]
    pub fn playhead_ratio(&self) -> f64 {
        let width = self.content.width();
        if width > 0.0 {
            self.viewport.scroll_offset / width
        } else {
            0.0
        }
    }

    // -- conversions -------------------------------------------------------

    /// `x = (t / duration) × width`.
    #[must_use]
    pub fn time_to_content(&self, time: f64) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        (time / self.duration) * self.content.width()
    }

    /// Inverse of [`time_to_content`](Self::time_to_content).
    #[must_use]
    pub fn content_to_time(&self, x: f64) -> f64 {
        let width = self.content.width();
        if !self.is_valid() || width <= 0.0 {
            return 0.0;
        }
        (x / width) * self.duration
    }

    /// `s = x − scroll_offset + viewport_width / 2`.
    #[inline]
    #[must_use]
    pub fn content_to_screen(&self, x: f64) -> f64 {
        x - self.viewport.scroll_offset + self.viewport.width / 2.0
    }

    /// Inverse of [`content_to_screen`](Self::content_to_screen).
    #[inline]
    #[must_use]
    pub fn screen_to_content(&self, s: f64) -> f64 {
        s + self.viewport.scroll_offset - self.viewport.width / 2.0
    }

    #[must_use]
    pub fn time_to_screen(&self, time: f64) -> f64 {
        self.content_to_screen(self.time_to_content(time))
    }

    #[must_use]
    pub fn screen_to_time(&self, s: f64) -> f64 {
        self.content_to_time(self.screen_to_content(s))
    }

    /// A content length expressed as a time span.
    #[inline]
    #[must_use]
    pub fn length_to_time(&self, length: f64) -> f64 {
        self.content_to_time(length)
    }

    /// A time span expressed as a content length.
    #[inline]
    #[must_use]
    pub fn time_to_length(&self, span: f64) -> f64 {
        self.time_to_content(span)
    }

    /// The time under the playhead.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.content_to_time(self.viewport.scroll_offset)
    }

    /// Move the playhead to `time` (clamped into the clip).
    pub fn set_current_time(&mut self, time: f64) {
        let offset = self.time_to_content(time);
        self.set_scroll_offset(offset);
    }

    /// Content interval `[left, right]` covered by the viewport.
    #[must_use]
    pub fn visible_content(&self) -> (f64, f64) {
        (self.screen_to_content(0.0), self.screen_to_content(self.viewport.width))
    }
}

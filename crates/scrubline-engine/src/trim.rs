#![forbid(unsafe_code)]

//! Trim knobs: dragging, crossing, edge-scroll, and separation.
//!
//! Two knobs live in fixed storage slots ([`KnobSlot::First`] and
//! [`KnobSlot::Second`]). Which slot plays the start role is a separate
//! mapping, so letting the knobs cross is a role swap, never a move of
//! knob state between slots.
//!
//! # State Machine
//!
//! ```text
//! Idle ──begin_drag──▶ Dragging ──edge zone──▶ EdgeScrolling
//!   ▲                    │   ▲                      │
//!   │                    │   └──── leave zone ──────┘
//!   └── end/cancel ──────┘        (or limit reached)
//! ```
//!
//! # Invariants
//!
//! 1. `time(start role) ≤ time(end role)` after every committed move.
//! 2. With passthrough off, a drag never brings the knobs closer than
//!    `min_separation`.
//! 3. After `end_drag` settles, the knobs are at least `min_separation`
//!    apart and inside `[0, duration]`.
//!
//! # Failure Modes
//!
//! - Drag targets outside the knob's move range are clamped.
//! - Edge-scroll overshoot past the move range is returned as a
//!   correction on the playhead time instead of moving the knob further.

use std::time::Duration;

use scrubline_core::animation::{Animation, Tween};
use scrubline_core::geometry::TimeSpace;
use scrubline_core::interaction::KnobSlot;
use scrubline_runtime::ScrubberConfig;
use tracing::{debug, trace};
use web_time::Instant;

/// How far outside its drawn frame a knob still accepts a touch, in pixels.
const KNOB_HIT_EXTEND: f64 = 5.0;

/// Role a knob slot currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrimRole {
    Start,
    End,
}

/// A trim interval in seconds, in role order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

/// Where a knob is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobLayout {
    pub slot: KnobSlot,
    /// Screen x of the knob's time edge.
    pub position: f64,
    /// The knob was pinned to a viewport edge or pushed to keep its
    /// distance from the other knob.
    pub out_of_screen: bool,
}

/// Both knobs, by role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedKnobs {
    pub start: KnobLayout,
    pub end: KnobLayout,
}

impl ResolvedKnobs {
    #[must_use]
    pub fn for_slot(&self, slot: KnobSlot) -> &KnobLayout {
        if self.start.slot == slot {
            &self.start
        } else {
            &self.end
        }
    }
}

/// What the host needs to finish a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEnd {
    pub slot: KnobSlot,
    /// An edge-scroll moved the playhead during the drag.
    pub edge_scrolled: bool,
    /// Playhead time when the drag began.
    pub start_current_time: f64,
}

/// Result of one edge-scroll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStep {
    pub knob_time: f64,
    pub current_time: f64,
    /// The knob reached its limit and edge-scroll stopped.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
struct EdgeScroll {
    strength: f64,
    /// Screen x the knob is held at.
    position: f64,
    last_change: Instant,
    last_offset: f64,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    slot: KnobSlot,
    start_x: f64,
    start_knob_time: f64,
    start_offset: f64,
    /// Time between the knob and where it is drawn when pinned.
    out_delta: f64,
    start_current_time: f64,
    /// The drag began inside an edge zone; edge-scroll waits until the
    /// pointer leaves it once.
    ignore_edge: bool,
    edge: Option<EdgeScroll>,
    edge_scrolled: bool,
}

// ---------------------------------------------------------------------------
// TrimController
// ---------------------------------------------------------------------------

/// Owns the two knob times, their role mapping, and the drag state.
#[derive(Debug, Clone)]
pub struct TrimController {
    times: [f64; 2],
    start_slot: KnobSlot,
    duration: f64,
    enabled: bool,
    visible: bool,
    interactive: bool,
    drag: Option<Drag>,
    settle: Option<[Tween; 2]>,
    min_separation: f64,
    passthrough: bool,
    knob_width: f64,
    edge_width: f64,
    edge_gain: f64,
    settle_duration: Duration,
}

impl TrimController {
    #[must_use]
    pub fn new(config: &ScrubberConfig) -> Self {
        Self {
            times: [0.0, 0.0],
            start_slot: KnobSlot::First,
            duration: 0.0,
            enabled: true,
            visible: true,
            interactive: true,
            drag: None,
            settle: None,
            min_separation: config.min_separation,
            passthrough: config.passthrough,
            knob_width: config.knob_width,
            edge_width: config.edge_width,
            edge_gain: config.edge_scroll_gain,
            settle_duration: config.trim_settle(),
        }
    }

    /// Start over for a clip of `duration` seconds: `[0, min(default_end, duration)]`.
    pub fn reset(&mut self, duration: f64, default_end: f64) {
        self.duration = duration.max(0.0);
        self.times = [0.0, default_end.min(self.duration).max(0.0)];
        self.start_slot = KnobSlot::First;
        self.drag = None;
        self.settle = None;
    }

    #[inline]
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    // -- roles -------------------------------------------------------------

    #[must_use]
    pub fn slot_for(&self, role: TrimRole) -> KnobSlot {
        match role {
            TrimRole::Start => self.start_slot,
            TrimRole::End => self.start_slot.other(),
        }
    }

    #[must_use]
    pub fn role_of(&self, slot: KnobSlot) -> TrimRole {
        if slot == self.start_slot {
            TrimRole::Start
        } else {
            TrimRole::End
        }
    }

    #[inline]
    #[must_use]
    pub fn time(&self, slot: KnobSlot) -> f64 {
        self.times[slot.index()]
    }

    #[must_use]
    pub fn time_of(&self, role: TrimRole) -> f64 {
        self.time(self.slot_for(role))
    }

    /// Committed trim range in role order, clamped into the clip.
    ///
    /// While the knobs settle this is the range they settle onto, not the
    /// eased times they are drawn at.
    #[must_use]
    pub fn current_trim(&self) -> TrimRange {
        let (start, end) = match &self.settle {
            Some(tweens) => (
                tweens[self.slot_for(TrimRole::Start).index()].end(),
                tweens[self.slot_for(TrimRole::End).index()].end(),
            ),
            None => (self.time_of(TrimRole::Start), self.time_of(TrimRole::End)),
        };
        TrimRange {
            start: start.max(0.0),
            end: end.min(self.duration),
        }
    }

    fn swap_roles(&mut self) {
        self.start_slot = self.start_slot.other();
        debug!(start = ?self.start_slot, "trim roles swapped");
    }

    /// Restore `start ≤ end`: by role swap with passthrough, by value swap
    /// without.
    fn normalize_roles(&mut self) {
        let start = self.start_slot.index();
        let end = self.start_slot.other().index();
        if self.times[start] > self.times[end] {
            if self.passthrough {
                self.swap_roles();
            } else {
                self.times.swap(start, end);
            }
        }
    }

    fn commit(&mut self, slot: KnobSlot, time: f64) {
        self.times[slot.index()] = time;
        self.normalize_roles();
    }

    // -- host API ----------------------------------------------------------

    /// Order `start`/`end`, clamp them into the clip, and push them apart
    /// evenly if they are closer than `min_separation`.
    fn separated(&self, start: f64, end: f64) -> (f64, f64) {
        let duration = self.duration;
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let (mut start, mut end) = (start.clamp(0.0, duration), end.clamp(0.0, duration));
        let gap = end - start;
        if gap < self.min_separation {
            let deficit = (self.min_separation - gap) / 2.0;
            start -= deficit;
            end += deficit;
            if start < 0.0 {
                end -= start;
                start = 0.0;
            }
            if end > duration {
                start -= end - duration;
                end = duration;
            }
        }
        (start.max(0.0), end)
    }

    /// Set both knobs immediately.
    pub fn set_trim(&mut self, start: f64, end: f64) {
        let (start, end) = self.separated(start, end);
        self.settle = None;
        self.times[self.start_slot.index()] = start;
        self.times[self.start_slot.other().index()] = end;
    }

    /// Ease both knobs onto `start`/`end`.
    pub fn settle_to(&mut self, start: f64, end: f64) {
        let (start, end) = self.separated(start, end);
        let start_index = self.start_slot.index();
        let mut tweens = [Tween::new(0.0, 0.0, Duration::ZERO); 2];
        for slot in KnobSlot::ALL {
            let target = if slot.index() == start_index { start } else { end };
            tweens[slot.index()] = Tween::new(self.time(slot), target, self.settle_duration);
        }
        self.settle = Some(tweens);
    }

    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Advance the settle animation. Returns `true` while it is running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(tweens) = self.settle.as_mut() else {
            return false;
        };
        let mut done = true;
        for (time, tween) in self.times.iter_mut().zip(tweens.iter_mut()) {
            tween.tick(dt);
            *time = tween.current();
            done &= tween.is_complete();
        }
        if done {
            self.settle = None;
        }
        !done
    }

    fn finish_settle(&mut self) {
        if let Some(mut tweens) = self.settle.take() {
            for (time, tween) in self.times.iter_mut().zip(tweens.iter_mut()) {
                tween.finish();
                *time = tween.current();
            }
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.interactive = false;
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Whether knobs accept touches right now.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.enabled && self.visible && self.interactive
    }

    // -- geometry ----------------------------------------------------------

    /// Times `slot` may move to given its current role.
    #[must_use]
    pub fn move_range(&self, slot: KnobSlot) -> (f64, f64) {
        let sep = self.min_separation;
        let duration = self.duration;
        let (lo, hi) = match (self.passthrough, self.role_of(slot)) {
            (true, TrimRole::Start) => (0.0, duration - sep),
            (true, TrimRole::End) => (sep, duration),
            (false, TrimRole::Start) => (0.0, self.time_of(TrimRole::End) - sep),
            (false, TrimRole::End) => (self.time_of(TrimRole::Start) + sep, duration),
        };
        let lo = lo.max(0.0).min(duration);
        (lo, hi.max(lo).min(duration))
    }

    /// Screen positions for both knobs, pinned inside the viewport.
    ///
    /// An off-screen knob is pinned one knob width in from the edge it left
    /// through, unless that would crowd the other knob. Knobs closer than
    /// `min_separation` on screen are pushed apart evenly.
    #[must_use]
    pub fn resolve_visible_positions(&self, space: &TimeSpace) -> ResolvedKnobs {
        let ps = space.time_to_screen(self.time_of(TrimRole::Start));
        let pe = space.time_to_screen(self.time_of(TrimRole::End));
        let vw = space.viewport_width();
        let kw = self.knob_width;
        let min_dist = space.time_to_length(self.min_separation);

        let (mut rs, mut start_fixed) = (ps, false);
        if ps < kw {
            rs = if pe - min_dist - kw < 0.0 { pe - min_dist } else { kw };
            start_fixed = true;
        } else if ps > vw {
            rs = vw;
            start_fixed = true;
        }

        let (mut re, mut end_fixed) = (pe, false);
        if pe < 0.0 {
            re = 0.0;
            end_fixed = true;
        } else if pe + kw > vw {
            re = if ps + min_dist + kw > vw { ps + min_dist } else { vw - kw };
            end_fixed = true;
        }

        let gap = (rs - re).abs();
        if gap < min_dist {
            let push = (min_dist - gap) / 2.0;
            rs -= push;
            re += push;
            start_fixed = true;
            end_fixed = true;
        }

        ResolvedKnobs {
            start: KnobLayout {
                slot: self.slot_for(TrimRole::Start),
                position: rs,
                out_of_screen: start_fixed,
            },
            end: KnobLayout {
                slot: self.slot_for(TrimRole::End),
                position: re,
                out_of_screen: end_fixed,
            },
        }
    }

    /// Knob under screen x, if knobs are interactive.
    ///
    /// The start knob is drawn left of its position and the end knob right
    /// of it; both accept touches a few pixels beyond their frame.
    #[must_use]
    pub fn hit_test(&self, x: f64, space: &TimeSpace) -> Option<KnobSlot> {
        if !self.is_interactive() {
            return None;
        }
        let knobs = self.resolve_visible_positions(space);
        let kw = self.knob_width;
        let start_frame = (
            knobs.start.position - kw - KNOB_HIT_EXTEND,
            knobs.start.position + KNOB_HIT_EXTEND,
        );
        let end_frame = (
            knobs.end.position - KNOB_HIT_EXTEND,
            knobs.end.position + kw + KNOB_HIT_EXTEND,
        );
        let on_start = x >= start_frame.0 && x <= start_frame.1;
        let on_end = x >= end_frame.0 && x <= end_frame.1;
        match (on_start, on_end) {
            (true, true) => {
                let start_center = knobs.start.position - kw / 2.0;
                let end_center = knobs.end.position + kw / 2.0;
                if (x - start_center).abs() <= (x - end_center).abs() {
                    Some(knobs.start.slot)
                } else {
                    Some(knobs.end.slot)
                }
            }
            (true, false) => Some(knobs.start.slot),
            (false, true) => Some(knobs.end.slot),
            (false, false) => None,
        }
    }

    /// Signed depth of `x` into an edge zone; zero outside both zones.
    #[must_use]
    pub fn edge_strength(&self, x: f64, viewport_width: f64) -> f64 {
        let ew = self.edge_width;
        if x >= viewport_width - ew {
            x + ew - viewport_width
        } else if x <= ew {
            x - ew
        } else {
            0.0
        }
    }

    /// Whether the limit of `slot`'s move range in `direction` is already
    /// on screen, so scrolling further could not help.
    #[must_use]
    pub fn direction_reaches_end(&self, slot: KnobSlot, direction: f64, space: &TimeSpace) -> bool {
        if direction == 0.0 {
            return false;
        }
        let (lo, hi) = self.move_range(slot);
        let limit = if direction > 0.0 { hi } else { lo };
        let x = space.time_to_screen(limit);
        x >= self.knob_width && x <= space.viewport_width() - self.knob_width
    }

    // -- drag --------------------------------------------------------------

    /// Whether `slot` may be dragged. A knob pinned to the viewport edge
    /// only answers taps.
    #[must_use]
    pub fn is_draggable(&self, slot: KnobSlot, space: &TimeSpace) -> bool {
        !self.resolve_visible_positions(space).for_slot(slot).out_of_screen
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn dragging_slot(&self) -> Option<KnobSlot> {
        self.drag.map(|drag| drag.slot)
    }

    #[must_use]
    pub fn is_edge_scrolling(&self) -> bool {
        self.drag.is_some_and(|drag| drag.edge.is_some())
    }

    /// Start dragging `slot` from screen x.
    pub fn begin_drag(&mut self, slot: KnobSlot, x: f64, space: &TimeSpace, current_time: f64) {
        self.finish_settle();
        let position = self.resolve_visible_positions(space).for_slot(slot).position;
        let knob_time = self.time(slot);
        self.drag = Some(Drag {
            slot,
            start_x: x,
            start_knob_time: knob_time,
            start_offset: space.scroll_offset(),
            out_delta: space.screen_to_time(position) - knob_time,
            start_current_time: current_time,
            ignore_edge: self.edge_strength(x, space.viewport_width()) != 0.0,
            edge: None,
            edge_scrolled: false,
        });
        debug!(slot = ?slot, time = knob_time, "knob drag started");
    }

    /// Follow the pointer to screen x. Returns the dragged knob's time.
    ///
    /// Inside an edge zone the knob is handed to edge-scroll instead of
    /// moving directly.
    pub fn update_drag(&mut self, x: f64, space: &TimeSpace, now: Instant) -> Option<f64> {
        let mut drag = self.drag?;
        let scrolled = space.scroll_offset() - drag.start_offset;
        let moved = x - drag.start_x + scrolled;
        let time_point = drag.start_knob_time + drag.out_delta + space.length_to_time(moved);
        let drag_point = space.screen_to_time(x);
        let on_knob = space.time_to_length(time_point - drag_point);
        let strength = self.edge_strength(x, space.viewport_width());
        let reached = self.direction_reaches_end(drag.slot, strength, space);

        if strength != 0.0 && !drag.ignore_edge && !reached {
            let position = x + on_knob;
            match drag.edge.as_mut() {
                Some(edge) => {
                    if edge.strength != strength {
                        edge.last_change = now;
                        edge.last_offset = space.scroll_offset();
                    }
                    edge.strength = strength;
                    edge.position = position;
                }
                None => {
                    drag.edge = Some(EdgeScroll {
                        strength,
                        position,
                        last_change: now,
                        last_offset: space.scroll_offset(),
                    });
                    drag.edge_scrolled = true;
                    debug!(slot = ?drag.slot, strength, "edge scroll started");
                }
            }
            self.drag = Some(drag);
            return Some(self.time(drag.slot));
        }

        let (lo, hi) = self.move_range(drag.slot);
        let time = time_point.max(lo).min(hi);
        if strength == 0.0 {
            drag.ignore_edge = false;
        }
        if (strength == 0.0 || reached) && drag.edge.take().is_some() {
            debug!(slot = ?drag.slot, "edge scroll stopped");
        }
        self.drag = Some(drag);
        self.commit(drag.slot, time);
        trace!(slot = ?drag.slot, time, "knob moved");
        Some(time)
    }

    /// Advance edge-scroll: move the viewport and carry the knob with it.
    pub fn edge_tick(&mut self, now: Instant, space: &mut TimeSpace) -> Option<EdgeStep> {
        let mut drag = self.drag?;
        let edge = drag.edge?;
        let elapsed = now.saturating_duration_since(edge.last_change).as_secs_f64();
        let dest = (edge.last_offset + elapsed * edge.strength * self.edge_gain)
            .max(0.0)
            .min(space.width());

        let (lo, hi) = self.move_range(drag.slot);
        let raw = space.content_to_time(edge.position - space.viewport_width() / 2.0 + dest);
        let knob_time = raw.max(lo).min(hi);
        let over_limit = raw - knob_time;
        self.commit(drag.slot, knob_time);
        space.set_current_time(space.content_to_time(dest) - over_limit);

        let finished = self.direction_reaches_end(drag.slot, edge.strength, space);
        if finished {
            drag.edge = None;
            debug!(slot = ?drag.slot, "edge scroll reached limit");
        }
        self.drag = Some(drag);
        Some(EdgeStep {
            knob_time,
            current_time: space.current_time(),
            finished,
        })
    }

    /// Finish the drag, settling the knobs apart if they ended too close.
    pub fn end_drag(&mut self) -> Option<DragEnd> {
        let drag = self.drag.take()?;
        self.normalize_roles();
        let start = self.time_of(TrimRole::Start);
        let end = self.time_of(TrimRole::End);
        if end - start < self.min_separation {
            self.settle_to(start, end);
        }
        let trim = self.current_trim();
        debug!(slot = ?drag.slot, start = trim.start, end = trim.end, "knob drag ended");
        Some(DragEnd {
            slot: drag.slot,
            edge_scrolled: drag.edge_scrolled,
            start_current_time: drag.start_current_time,
        })
    }

    /// Abort the drag and put the knob back where it started.
    pub fn cancel_drag(&mut self) -> Option<DragEnd> {
        let drag = self.drag.take()?;
        self.times[drag.slot.index()] = drag.start_knob_time;
        self.normalize_roles();
        debug!(slot = ?drag.slot, "knob drag cancelled");
        Some(DragEnd {
            slot: drag.slot,
            edge_scrolled: drag.edge_scrolled,
            start_current_time: drag.start_current_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubline_core::geometry::{ContentSpace, Viewport};

    const LONG: Duration = Duration::from_secs(1);

    // 80 px per second, playhead at 2.5 s, screen x = 80·t - 40.
    fn space() -> TimeSpace {
        TimeSpace::new(
            10.0,
            ContentSpace::new(800.0, 80.0, 800.0),
            Viewport {
                scroll_offset: 200.0,
                width: 320.0,
                height: 60.0,
            },
        )
    }

    fn trim(passthrough: bool) -> TrimController {
        let config = ScrubberConfig {
            passthrough,
            ..ScrubberConfig::default()
        };
        let mut trim = TrimController::new(&config);
        trim.reset(10.0, 3.0);
        trim
    }

    #[test]
    fn reset_defaults() {
        let t = trim(true);
        assert_eq!(t.current_trim(), TrimRange { start: 0.0, end: 3.0 });
        let mut short = trim(true);
        short.reset(1.5, 3.0);
        assert_eq!(short.current_trim().end, 1.5);
    }

    #[test]
    fn move_range_with_and_without_passthrough() {
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        assert_eq!(t.move_range(KnobSlot::First), (0.0, 9.9));
        assert_eq!(t.move_range(KnobSlot::Second), (0.1, 10.0));
        let mut t = trim(false);
        t.set_trim(2.0, 3.0);
        assert_eq!(t.move_range(KnobSlot::First), (0.0, 2.9));
        assert!((t.move_range(KnobSlot::Second).0 - 2.1).abs() < 1e-12);
    }

    #[test]
    fn blocked_drag_keeps_separation() {
        let s = space();
        let mut t = trim(false);
        t.set_trim(2.0, 3.0);
        t.begin_drag(KnobSlot::First, 120.0, &s, 2.5);
        // 84 px right of the start would be 3.05 s.
        let time = t.update_drag(204.0, &s, Instant::now()).unwrap();
        assert!((time - 2.9).abs() < 1e-9);
        assert!(t.time_of(TrimRole::Start) <= 2.9 + 1e-9);
        t.end_drag();
        t.tick(LONG);
        let range = t.current_trim();
        assert!(range.end - range.start >= 0.1 - 1e-9);
        assert!(range.start <= 2.9 + 1e-9);
    }

    #[test]
    fn crossing_swaps_roles() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        t.begin_drag(KnobSlot::First, 120.0, &s, 2.5);
        t.update_drag(240.0, &s, Instant::now());
        assert!((t.time(KnobSlot::First) - 3.5).abs() < 1e-9);
        assert_eq!(t.slot_for(TrimRole::Start), KnobSlot::Second);
        assert_eq!(t.role_of(KnobSlot::First), TrimRole::End);
        let range = t.current_trim();
        assert!((range.start - 3.0).abs() < 1e-9);
        assert!((range.end - 3.5).abs() < 1e-9);
    }

    #[test]
    fn end_drag_pushes_apart_symmetrically() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        t.begin_drag(KnobSlot::First, 120.0, &s, 2.5);
        // 2.98 s: 0.02 s from the end knob.
        t.update_drag(198.4, &s, Instant::now());
        let end = t.end_drag().unwrap();
        assert_eq!(end.start_current_time, 2.5);
        assert!(!end.edge_scrolled);
        assert!(t.is_settling());
        // Reported range is already the settled one; the knob is still drawn
        // where it was released.
        let committed = t.current_trim();
        assert!((committed.start - 2.94).abs() < 1e-9);
        assert!((committed.end - 3.04).abs() < 1e-9);
        assert!((t.time(KnobSlot::First) - 2.98).abs() < 1e-9);
        assert!(!t.tick(LONG));
        let range = t.current_trim();
        assert!((range.start - 2.94).abs() < 1e-9);
        assert!((range.end - 3.04).abs() < 1e-9);
    }

    #[test]
    fn separation_fix_stays_in_clip() {
        let mut t = trim(true);
        t.times = [9.98, 10.0];
        t.drag = Some(Drag {
            slot: KnobSlot::First,
            start_x: 0.0,
            start_knob_time: 9.98,
            start_offset: 0.0,
            out_delta: 0.0,
            start_current_time: 0.0,
            ignore_edge: false,
            edge: None,
            edge_scrolled: false,
        });
        t.end_drag();
        t.tick(LONG);
        let range = t.current_trim();
        assert_eq!(range.end, 10.0);
        assert!((range.start - 9.9).abs() < 1e-9);
    }

    #[test]
    fn set_trim_clamps_orders_and_separates() {
        let mut t = trim(true);
        t.set_trim(-1.0, 12.0);
        assert_eq!(t.current_trim(), TrimRange { start: 0.0, end: 10.0 });
        t.set_trim(5.0, 4.0);
        assert_eq!(t.current_trim(), TrimRange { start: 4.0, end: 5.0 });
        assert_eq!(t.slot_for(TrimRole::Start), KnobSlot::First);

        t.set_trim(5.0, 5.02);
        let range = t.current_trim();
        assert!((range.start - 4.96).abs() < 1e-9);
        assert!((range.end - 5.06).abs() < 1e-9);

        t.set_trim(9.99, 12.0);
        let range = t.current_trim();
        assert_eq!(range.end, 10.0);
        assert!((range.start - 9.9).abs() < 1e-9);
    }

    #[test]
    fn animated_set_trim_settles_apart() {
        let mut t = trim(false);
        t.settle_to(3.0, 3.0);
        let range = t.current_trim();
        assert!((range.start - 2.95).abs() < 1e-9);
        assert!((range.end - 3.05).abs() < 1e-9);
        assert!(!t.tick(LONG));
        assert!((t.time_of(TrimRole::End) - 3.05).abs() < 1e-9);
    }

    #[test]
    fn cancel_restores_knob() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        t.begin_drag(KnobSlot::First, 120.0, &s, 2.5);
        t.update_drag(240.0, &s, Instant::now());
        t.cancel_drag();
        assert_eq!(t.current_trim(), TrimRange { start: 2.0, end: 3.0 });
        assert_eq!(t.slot_for(TrimRole::Start), KnobSlot::First);
    }

    #[test]
    fn offscreen_knobs_are_pinned() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(0.0, 9.0);
        let knobs = t.resolve_visible_positions(&s);
        assert_eq!(knobs.start.position, 20.0);
        assert!(knobs.start.out_of_screen);
        assert_eq!(knobs.end.position, 300.0);
        assert!(knobs.end.out_of_screen);
        t.set_trim(2.0, 3.0);
        let knobs = t.resolve_visible_positions(&s);
        assert_eq!(knobs.start.position, 120.0);
        assert!(!knobs.start.out_of_screen);
    }

    #[test]
    fn pinned_knobs_are_not_draggable() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(0.0, 9.0);
        assert!(!t.is_draggable(KnobSlot::First, &s));
        assert!(!t.is_draggable(KnobSlot::Second, &s));
        t.set_trim(2.0, 3.0);
        assert!(t.is_draggable(KnobSlot::First, &s));
        assert!(t.is_draggable(KnobSlot::Second, &s));
    }

    #[test]
    fn hit_test_frames() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        assert_eq!(t.hit_test(100.0, &s), Some(KnobSlot::First));
        assert_eq!(t.hit_test(215.0, &s), Some(KnobSlot::Second));
        assert_eq!(t.hit_test(160.0, &s), None);
        t.set_interactive(false);
        assert_eq!(t.hit_test(100.0, &s), None);
    }

    #[test]
    fn edge_strength_zones() {
        let t = trim(true);
        assert_eq!(t.edge_strength(300.0, 320.0), 20.0);
        assert_eq!(t.edge_strength(10.0, 320.0), -30.0);
        assert_eq!(t.edge_strength(160.0, 320.0), 0.0);
    }

    #[test]
    fn edge_scroll_carries_knob() {
        let mut s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        let t0 = Instant::now();
        t.begin_drag(KnobSlot::Second, 200.0, &s, 2.5);
        // Hold the pointer 20 px into the right edge zone.
        t.update_drag(300.0, &s, t0);
        assert!(t.is_edge_scrolling());
        let step = t.edge_tick(t0 + Duration::from_secs(1), &mut s).unwrap();
        // 1 s × 20 px × gain 5 = 100 px of scroll.
        assert!((s.scroll_offset() - 300.0).abs() < 1e-9);
        assert!((step.current_time - 3.75).abs() < 1e-9);
        assert!((step.knob_time - 5.5).abs() < 1e-9);
        assert!(!step.finished);
        assert!(t.end_drag().unwrap().edge_scrolled);
    }

    #[test]
    fn edge_scroll_stops_at_move_limit() {
        let mut s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        let t0 = Instant::now();
        t.begin_drag(KnobSlot::Second, 200.0, &s, 2.5);
        t.update_drag(300.0, &s, t0);
        // 5 s × 20 px × gain 5 = 500 px; the knob would land at 10.5 s.
        let step = t.edge_tick(t0 + Duration::from_secs(5), &mut s).unwrap();
        assert_eq!(step.knob_time, 10.0);
        assert_eq!(t.time(KnobSlot::Second), 10.0);
        // The 0.5 s overshoot comes off the playhead so the knob stays
        // under the pointer.
        assert!((step.current_time - 8.25).abs() < 1e-9);
        assert!((s.scroll_offset() - 660.0).abs() < 1e-9);
        assert!(step.finished);
        assert!(!t.is_edge_scrolling());
        assert!(t.is_dragging());
    }

    #[test]
    fn edge_scroll_can_carry_knob_across() {
        let mut s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        let t0 = Instant::now();
        t.begin_drag(KnobSlot::First, 120.0, &s, 2.5);
        t.update_drag(300.0, &s, t0);
        assert!(t.is_edge_scrolling());

        let step = t.edge_tick(t0 + Duration::from_secs(1), &mut s).unwrap();
        assert!((step.knob_time - 5.5).abs() < 1e-9);
        assert_eq!(t.slot_for(TrimRole::Start), KnobSlot::Second);
        assert_eq!(t.role_of(KnobSlot::First), TrimRole::End);
        let range = t.current_trim();
        assert!((range.start - 3.0).abs() < 1e-9);
        assert!((range.end - 5.5).abs() < 1e-9);
        assert!(!step.finished);

        // Now the end knob, it keeps riding the scroll.
        let step = t.edge_tick(t0 + Duration::from_secs(2), &mut s).unwrap();
        assert!((step.knob_time - 6.75).abs() < 1e-9);
        assert!((t.current_trim().end - 6.75).abs() < 1e-9);
        assert_eq!(t.current_trim().start, 3.0);
    }

    #[test]
    fn drag_started_in_edge_zone_waits() {
        let s = space();
        let mut t = trim(true);
        t.set_trim(2.0, 3.0);
        t.begin_drag(KnobSlot::Second, 300.0, &s, 2.5);
        t.update_drag(305.0, &s, Instant::now());
        assert!(!t.is_edge_scrolling());
        t.update_drag(200.0, &s, Instant::now());
        t.update_drag(305.0, &s, Instant::now());
        assert!(t.is_edge_scrolling());
    }
}

#![forbid(unsafe_code)]

//! Explicit interaction context shared by the gesture state machines.
//!
//! [`InteractionContext`] replaces ambient "who is touching what" state. It
//! holds the active pointers (in arrival order), the current gesture owner,
//! and the host's scroll-tracking flags. Controllers receive it by reference
//! on every call instead of reading it from a parent object.
//!
//! # State Machine
//!
//! The gesture owner moves between:
//!
//! - `Idle`: no gesture in progress.
//! - `Scroll`: the host is panning the timeline.
//! - `Pinch`: two pointers are down and zooming.
//! - `Knob(slot)`: a single pointer is dragging a trim knob.
//!
//! # Invariants
//!
//! 1. A pointer id appears at most once.
//! 2. [`pinch_pair`](InteractionContext::pinch_pair) is `Some` iff at least
//!    two pointers are down; it always returns the two oldest pointers.
//! 3. [`in_action`](InteractionContext::in_action) is `true` while any
//!    pointer is down or the host reports tracking/deceleration.
//! 4. After `reset()`, no pointers are tracked and the owner is `Idle`.
//!
//! # Failure Modes
//!
//! - Moving or lifting an unknown pointer id is ignored.

use crate::geometry::Point;
use crate::logging::{debug_event, trace_event};

/// Host-assigned identifier of a touch or pointer.
pub type PointerId = u64;

/// One of the two fixed knob storage slots.
///
/// Slots never change identity; which slot currently plays the "start" or
/// "end" role is tracked separately by the trim controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobSlot {
    First,
    Second,
}

impl KnobSlot {
    pub const ALL: [KnobSlot; 2] = [KnobSlot::First, KnobSlot::Second];

    /// The opposite slot.
    #[inline]
    #[must_use]
    pub const fn other(self) -> KnobSlot {
        match self {
            KnobSlot::First => KnobSlot::Second,
            KnobSlot::Second => KnobSlot::First,
        }
    }

    /// Array index of this slot.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            KnobSlot::First => 0,
            KnobSlot::Second => 1,
        }
    }
}

/// Where a pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The filmstrip, ruler, or any non-knob area.
    Timeline,
    /// A trim knob handle.
    Knob(KnobSlot),
}

/// Which state machine currently owns the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureOwner {
    #[default]
    Idle,
    Scroll,
    Pinch,
    Knob(KnobSlot),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedPointer {
    id: PointerId,
    position: Point,
    target: PointerTarget,
}

// ---------------------------------------------------------------------------
// InteractionContext
// ---------------------------------------------------------------------------

/// Active pointers, gesture owner, and host scroll flags.
#[derive(Debug, Clone, Default)]
pub struct InteractionContext {
    pointers: Vec<TrackedPointer>,
    owner: GestureOwner,
    scroll_tracking: bool,
    decelerating: bool,
    animating: bool,
}

impl InteractionContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pointers: Vec::with_capacity(2),
            ..Self::default()
        }
    }

    /// Register a pointer. Returns the number of active pointers.
    pub fn pointer_down(&mut self, id: PointerId, position: Point, target: PointerTarget) -> usize {
        if let Some(existing) = self.pointers.iter_mut().find(|p| p.id == id) {
            existing.position = position;
        } else {
            self.pointers.push(TrackedPointer {
                id,
                position,
                target,
            });
        }
        trace_event!(pointer = id, count = self.pointers.len(), "pointer down");
        self.pointers.len()
    }

    /// Update a pointer position. Returns `false` for unknown ids.
    pub fn pointer_moved(&mut self, id: PointerId, position: Point) -> bool {
        match self.pointers.iter_mut().find(|p| p.id == id) {
            Some(pointer) => {
                pointer.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a pointer. Returns where it had gone down, if it was tracked.
    pub fn pointer_up(&mut self, id: PointerId) -> Option<PointerTarget> {
        let index = self.pointers.iter().position(|p| p.id == id)?;
        let removed = self.pointers.remove(index);
        trace_event!(pointer = id, count = self.pointers.len(), "pointer up");
        Some(removed.target)
    }

    #[inline]
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// The two oldest pointers, if a pinch is possible.
    #[must_use]
    pub fn pinch_pair(&self) -> Option<(Point, Point)> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some((a.position, b.position)),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn owner(&self) -> GestureOwner {
        self.owner
    }

    pub fn set_owner(&mut self, owner: GestureOwner) {
        if self.owner != owner {
            debug_event!(from = ?self.owner, to = ?owner, "gesture owner changed");
            self.owner = owner;
        }
    }

    /// Return to `Idle` if `owner` currently owns the interaction.
    pub fn release(&mut self, owner: GestureOwner) {
        if self.owner == owner {
            self.set_owner(GestureOwner::Idle);
        }
    }

    /// Host reports that the user is actively panning the timeline.
    pub fn set_scroll_tracking(&mut self, tracking: bool) {
        self.scroll_tracking = tracking;
    }

    /// Host reports that a released pan is still decelerating.
    pub fn set_decelerating(&mut self, decelerating: bool) {
        self.decelerating = decelerating;
    }

    #[inline]
    #[must_use]
    pub const fn is_scroll_tracking(&self) -> bool {
        self.scroll_tracking
    }

    #[inline]
    #[must_use]
    pub const fn is_decelerating(&self) -> bool {
        self.decelerating
    }

    /// A settle or seek animation is running.
    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
    }

    #[inline]
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animating
    }

    /// Whether a user interaction is in progress.
    #[must_use]
    pub fn in_action(&self) -> bool {
        !self.pointers.is_empty() || self.scroll_tracking || self.decelerating
    }

    /// Drop all pointers and return to idle.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.owner = GestureOwner::Idle;
        self.scroll_tracking = false;
        self.decelerating = false;
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Point {
        Point::new(x, 0.0)
    }

    #[test]
    fn pointer_lifecycle() {
        let mut ctx = InteractionContext::new();
        assert!(!ctx.in_action());
        assert_eq!(ctx.pointer_down(1, p(10.0), PointerTarget::Timeline), 1);
        assert!(ctx.in_action());
        assert!(ctx.pinch_pair().is_none());
        assert_eq!(ctx.pointer_down(2, p(50.0), PointerTarget::Timeline), 2);
        assert_eq!(ctx.pinch_pair(), Some((p(10.0), p(50.0))));
        assert!(ctx.pointer_moved(2, p(70.0)));
        assert_eq!(ctx.pinch_pair(), Some((p(10.0), p(70.0))));
        assert_eq!(ctx.pointer_up(1), Some(PointerTarget::Timeline));
        assert_eq!(ctx.pointer_count(), 1);
        assert!(ctx.pinch_pair().is_none());
    }

    #[test]
    fn duplicate_down_updates_position() {
        let mut ctx = InteractionContext::new();
        ctx.pointer_down(7, p(1.0), PointerTarget::Timeline);
        assert_eq!(ctx.pointer_down(7, p(2.0), PointerTarget::Timeline), 1);
        ctx.pointer_down(8, p(5.0), PointerTarget::Timeline);
        assert_eq!(ctx.pinch_pair(), Some((p(2.0), p(5.0))));
    }

    #[test]
    fn unknown_pointer_is_ignored() {
        let mut ctx = InteractionContext::new();
        assert!(!ctx.pointer_moved(9, p(0.0)));
        assert!(ctx.pointer_up(9).is_none());
    }

    #[test]
    fn pointer_up_reports_down_target() {
        let mut ctx = InteractionContext::new();
        ctx.pointer_down(1, p(0.0), PointerTarget::Knob(KnobSlot::First));
        ctx.pointer_down(2, p(0.0), PointerTarget::Timeline);
        assert_eq!(ctx.pointer_up(1), Some(PointerTarget::Knob(KnobSlot::First)));
        assert_eq!(ctx.pointer_up(2), Some(PointerTarget::Timeline));
        assert!(!ctx.in_action());
    }

    #[test]
    fn release_only_clears_matching_owner() {
        let mut ctx = InteractionContext::new();
        ctx.set_owner(GestureOwner::Pinch);
        ctx.release(GestureOwner::Scroll);
        assert_eq!(ctx.owner(), GestureOwner::Pinch);
        ctx.release(GestureOwner::Pinch);
        assert_eq!(ctx.owner(), GestureOwner::Idle);
    }

    #[test]
    fn scroll_flags_count_as_action() {
        let mut ctx = InteractionContext::new();
        ctx.set_decelerating(true);
        assert!(ctx.in_action());
        ctx.reset();
        assert!(!ctx.in_action());
    }

    #[test]
    fn knob_slot_other() {
        assert_eq!(KnobSlot::First.other(), KnobSlot::Second);
        assert_eq!(KnobSlot::Second.other().index(), 0);
    }
}

#![forbid(unsafe_code)]

//! Core: time/content/screen geometry, easing, and pointer interaction state.
//!
//! # Role in Scrubline
//! `scrubline-core` is the pure layer. It owns the coordinate model shared by
//! every controller in `scrubline-engine` and carries no I/O, no threads, and
//! no hidden state.
//!
//! # Primary responsibilities
//! - **TimeSpace**: conversions between time, content position, and screen
//!   position, plus the power-of-two zoom ladder ([`geometry::snap_width`]).
//! - **Animation**: the ease-out curve and [`animation::Tween`] targets. The
//!   host decides how interpolated values are drawn.
//! - **InteractionContext**: active pointers and the current gesture owner,
//!   passed explicitly into the state machines that consume them.
//! - **Timecode**: `MM:SS.cc` and `MM:SS` labels.

pub mod animation;
pub mod geometry;
pub mod interaction;
pub(crate) mod logging;
pub mod timecode;

pub use geometry::{ContentSpace, Point, Size, TimeSpace, Viewport, snap_width};
pub use interaction::{GestureOwner, InteractionContext, KnobSlot, PointerId, PointerTarget};

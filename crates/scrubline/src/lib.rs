#![forbid(unsafe_code)]

//! Scrubline public facade crate.
//!
//! Re-exports the types a host needs to embed the timeline scrubber and
//! offers a prelude for day-to-day usage. The host supplies a
//! [`FrameProvider`] and a [`Player`], forwards pointer, scroll, and layout
//! events, and calls [`Scrubber::tick`] from its frame clock.
//!
//! ```
//! use scrubline::prelude::*;
//!
//! struct Frames;
//!
//! impl FrameProvider for Frames {
//!     type Image = ();
//!     fn request(&mut self, request: FrameRequest, sink: FrameSink<()>) {
//!         for t in request.timestamps {
//!             sink.deliver(t, Ok(()));
//!         }
//!     }
//!     fn cancel_all(&mut self) {}
//! }
//!
//! #[derive(Default)]
//! struct Clock {
//!     time: f64,
//!     playing: bool,
//! }
//!
//! impl Player for Clock {
//!     fn current_time(&self) -> f64 { self.time }
//!     fn seek(&mut self, to: f64, _before: f64, _after: f64) { self.time = to; }
//!     fn play(&mut self) { self.playing = true; }
//!     fn pause(&mut self) { self.playing = false; }
//!     fn is_playing(&self) -> bool { self.playing }
//! }
//!
//! # fn main() -> scrubline::Result<()> {
//! let mut scrubber = Scrubber::new(Frames, Clock::default(), ScrubberConfig::default());
//! scrubber.layout(320.0, 100.0)?;
//! scrubber.load_clip(10.0, Size::new(160.0, 90.0))?;
//! scrubber.tick(Instant::now());
//! assert!(!scrubber.visible_frames().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::{ClipError, ConfigError, DegradationAction, Error, FrameError, Result};

// --- Core re-exports -------------------------------------------------------

pub use scrubline_core::timecode::{format_clock, format_ruler};
pub use scrubline_core::{
    ContentSpace, GestureOwner, KnobSlot, Point, PointerId, Size, TimeSpace, Viewport,
};

// --- Runtime re-exports ----------------------------------------------------

pub use scrubline_runtime::{CancellationToken, ScrubberConfig};

// --- Engine re-exports -----------------------------------------------------

pub use scrubline_engine::{
    FrameProvider, FrameRequest, FrameSink, Layout, MinorMarks, Player, ResolvedKnobs, RulerTick,
    Scrubber, ScrubberListener, SlotState, Tier, TrimRange, TrimRole, VisibleFrame,
};

/// Monotonic clock used for ticks and task deadlines.
pub use web_time::Instant;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FrameProvider, FrameRequest, FrameSink, Instant, Player, Point, Result, Scrubber,
        ScrubberConfig, ScrubberListener, Size, TrimRange,
    };

    pub use crate::{core, engine, runtime};
}

pub use scrubline_core as core;
pub use scrubline_engine as engine;
pub use scrubline_runtime as runtime;

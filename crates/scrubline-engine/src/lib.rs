#![forbid(unsafe_code)]

//! Engine: the interaction layer of the timeline scrubber.
//!
//! # Role in Scrubline
//! `scrubline-engine` turns host events (pointers, scroll, layout, clock
//! ticks) into changes of one shared [`TimeSpace`](scrubline_core::TimeSpace),
//! thumbnail requests, and player seeks.
//!
//! # Primary responsibilities
//! - **ThumbnailScheduler**: level-of-detail slot tiers and batched,
//!   de-duplicated frame requests.
//! - **ZoomController**: pinch zoom with a snapped settle.
//! - **TrimController**: knob drag, crossing, edge-scroll, and separation.
//! - **PlaybackSync**: coalesced seeks, end detection, looping.
//! - **Scrubber**: the facade that owns all of the above plus the external
//!   [`FrameProvider`] and [`Player`].

pub mod error;
pub mod layout;
pub mod listener;
pub mod playback;
pub mod player;
pub mod provider;
pub mod ruler;
pub mod scrubber;
pub mod thumbnails;
pub mod trim;
pub mod zoom;

pub use error::{ClipError, FrameError};
pub use layout::Layout;
pub use listener::ScrubberListener;
pub use playback::{EndReach, PlaybackSync, PollOutcome};
pub use player::Player;
pub use provider::{FrameCompletion, FrameProvider, FrameRequest, FrameSink};
pub use ruler::{MinorMarks, Ruler, RulerTick};
pub use scrubber::{ANIMATION_TASK, EDGE_SCROLL_TASK, PLAYBACK_POLL_TASK, Scrubber};
pub use thumbnails::{
    DetailTiers, SlotGeometry, SlotState, ThumbnailScheduler, ThumbnailSlot, Tier, VisibleFrame,
    compute_tiers, visible_range,
};
pub use trim::{KnobLayout, ResolvedKnobs, TrimController, TrimRange, TrimRole};
pub use zoom::{ZoomController, pinch_width};

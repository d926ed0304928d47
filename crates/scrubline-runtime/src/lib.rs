#![forbid(unsafe_code)]

//! Scrubline Runtime
//!
//! Cooperative scheduling primitives and policy configuration shared by the
//! scrubber engine.
//!
//! # Key Components
//!
//! - [`TaskScheduler`] - Named recurring tasks driven by an injected clock
//! - [`CancellationSource`] / [`CancellationToken`] - Cooperative cancellation
//! - [`ScrubberConfig`] - Every tunable constant as policy-as-data
//!
//! # Role in Scrubline
//! The engine never owns a timer. Each fixed-interval loop (pinch settle,
//! edge scroll, playback poll) is a named task registered here; the host
//! calls the engine's `tick(now)` and the scheduler reports which tasks are
//! due.

pub mod cancellation;
pub mod config;
pub mod scheduler;

pub use cancellation::{CancellationSource, CancellationToken};
pub use config::{ConfigError, ScrubberConfig};
pub use scheduler::{TaskName, TaskScheduler};

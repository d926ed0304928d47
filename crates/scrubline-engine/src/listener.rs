#![forbid(unsafe_code)]

//! Outward notifications.
//!
//! A host registers one [`ScrubberListener`]. Every method has a no-op
//! default so hosts implement only what they observe.

/// Receives scrubber notifications.
pub trait ScrubberListener {
    /// The playhead moved because of user interaction or a loop seek.
    fn on_moved(&mut self, _time: f64) {}

    /// A knob drag changed the trim range.
    fn on_trim_changed(&mut self, _start: f64, _end: f64) {}

    /// Playback stopped at an end or by request.
    fn on_stopped(&mut self) {}
}

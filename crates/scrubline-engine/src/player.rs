#![forbid(unsafe_code)]

//! External collaborator: the media player transport.

/// Playback transport the scrubber drives.
pub trait Player {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Seek to `to`, accepting any frame within `tolerance_before` seconds
    /// before or `tolerance_after` seconds after it.
    fn seek(&mut self, to: f64, tolerance_before: f64, tolerance_after: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;
}

#![forbid(unsafe_code)]

//! Keeping the player and the scrubber in step.
//!
//! Seeks issued while scrubbing are coalesced: each one tolerates a frame
//! as far away as the distance since the previous seek, so a fast scrub
//! lands on cheap keyframes and a slow one gets exact frames.
//!
//! # Invariants
//!
//! 1. The poll never plays the player while the user is interacting.
//! 2. Reaching the movie end always stops, whatever the loop setting.
//! 3. While the manual-past-end flag is set, the trim end is not reported.

use tracing::debug;

use crate::player::Player;
use crate::trim::TrimRange;

/// Which end the playhead has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndReach {
    pub trim_end: bool,
    pub movie_end: bool,
}

impl EndReach {
    #[inline]
    #[must_use]
    pub const fn reached(&self) -> bool {
        self.trim_end || self.movie_end
    }
}

/// What a poll tick decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// Interaction or animation in progress; nothing to follow.
    Held,
    /// Looped back to the trim start.
    Looped { time: f64 },
    /// An end was reached; playback must stop at `time`.
    Stopped { time: f64 },
    /// The playhead follows the player. `after_loop` is set on the first
    /// tick after a loop seek.
    Advanced { time: f64, after_loop: bool },
}

/// Player seeks, end detection, and the playback poll.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSync {
    previous_seek: f64,
    active: bool,
    manual_after_end: bool,
    looped: bool,
    loop_playback: bool,
}

impl PlaybackSync {
    #[must_use]
    pub fn new(loop_playback: bool) -> Self {
        Self {
            loop_playback,
            ..Self::default()
        }
    }

    /// Forget everything tied to the previous clip.
    pub fn reset(&mut self) {
        self.previous_seek = 0.0;
        self.active = false;
        self.manual_after_end = false;
        self.looped = false;
    }

    /// Playback was started and not stopped since.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    #[must_use]
    pub const fn manual_after_end(&self) -> bool {
        self.manual_after_end
    }

    /// Record whether the user left the playhead past the trim end.
    pub fn update_manual_flag(&mut self, current_time: f64, trim_end: f64) {
        self.manual_after_end = current_time >= trim_end;
    }

    pub fn set_loop(&mut self, loop_playback: bool) {
        self.loop_playback = loop_playback;
    }

    #[inline]
    #[must_use]
    pub const fn loop_playback(&self) -> bool {
        self.loop_playback
    }

    /// Seek with a tolerance equal to the distance from the previous seek.
    pub fn seek_coalesced<Y: Player + ?Sized>(&mut self, player: &mut Y, time: f64) {
        let tolerance = (time - self.previous_seek).abs();
        player.seek(time, tolerance, tolerance);
        self.previous_seek = time;
    }

    /// Seek to the exact frame.
    pub fn seek_accurate<Y: Player + ?Sized>(&mut self, player: &mut Y, time: f64) {
        self.previous_seek = time;
        player.seek(time, 0.0, 0.0);
    }

    /// End detection at `time`. `trim` is `None` when trimming is disabled.
    #[must_use]
    pub fn reaches_end(&self, time: f64, trim: Option<TrimRange>, duration: f64) -> EndReach {
        let mut reach = EndReach {
            trim_end: trim.is_some_and(|trim| time >= trim.end) && !self.manual_after_end,
            movie_end: false,
        };
        if time >= duration {
            if trim.is_some_and(|trim| trim.end < duration) {
                reach.trim_end = false;
            }
            reach.movie_end = true;
        }
        reach
    }

    /// Start playback, first rewinding if the playhead at `time` sits on a
    /// reached end. Returns the rewind target, if any.
    ///
    /// `time` is the scrubber's playhead, not the player clock, which may
    /// still lag behind a coalesced seek.
    pub fn play<Y: Player + ?Sized>(
        &mut self,
        player: &mut Y,
        time: f64,
        trim: Option<TrimRange>,
        duration: f64,
    ) -> Option<f64> {
        let reach = self.reaches_end(time, trim, duration);
        let rewind = match (reach.trim_end, reach.movie_end, trim) {
            (true, _, Some(trim)) => Some(trim.start),
            (_, true, _) => Some(0.0),
            _ => None,
        };
        if let Some(time) = rewind {
            self.seek_accurate(player, time);
            self.manual_after_end = false;
        }
        player.play();
        self.active = true;
        debug!(rewind = ?rewind, "playback started");
        rewind
    }

    /// Pause and leave the active state.
    pub fn stop<Y: Player + ?Sized>(&mut self, player: &mut Y) {
        player.pause();
        self.active = false;
        self.looped = false;
        debug!("playback stopped");
    }

    /// One poll tick.
    pub fn poll<Y: Player + ?Sized>(
        &mut self,
        player: &mut Y,
        in_action: bool,
        animating: bool,
        trim: Option<TrimRange>,
        duration: f64,
    ) -> PollOutcome {
        if in_action {
            if player.is_playing() {
                player.pause();
            }
            return PollOutcome::Held;
        }

        let time = player.current_time();
        let reach = self.reaches_end(time, trim, duration);
        if reach.reached() {
            self.manual_after_end = false;
            if let (true, true, Some(trim)) = (self.loop_playback, reach.trim_end, trim) {
                player.pause();
                self.seek_accurate(player, trim.start);
                self.looped = true;
                debug!(to = trim.start, "looping to trim start");
                return PollOutcome::Looped { time: trim.start };
            }
            debug!(time, movie_end = reach.movie_end, "playback reached end");
            return PollOutcome::Stopped { time };
        }

        if animating {
            return PollOutcome::Held;
        }
        if !player.is_playing() {
            player.play();
        }
        PollOutcome::Advanced {
            time,
            after_loop: std::mem::take(&mut self.looped),
        }
    }
}

#![forbid(unsafe_code)]

//! The scrubber: one [`TimeSpace`] shared by every controller.
//!
//! [`Scrubber`] owns the frame provider, the player, the interaction
//! context, and the controllers, and routes host events between them.
//! Nothing runs on its own: the host delivers pointer and scroll events as
//! they happen and calls [`Scrubber::tick`] from its frame clock, which
//! drains frame completions and runs whichever named tasks are due.
//!
//! # Tasks
//!
//! | name | runs while |
//! |------|------------|
//! | `animation` | a pinch settle, knob settle, or animated seek is in progress |
//! | `edge-scroll` | a dragged knob is held in an edge zone |
//! | `playback-poll` | playback is active |
//!
//! # Invariants
//!
//! 1. Only one gesture owns the interaction at a time: a second pointer
//!    cancels a knob drag before a pinch begins.
//! 2. Pointer input is ignored while an animated seek runs.
//! 3. The playhead never follows the player while the user interacts.
//!
//! # Failure Modes
//!
//! - `load_clip` and `layout` reject invalid input with [`ClipError`] and
//!   leave the previous state untouched.
//! - Events before the first successful `load_clip` only track pointers.
//! - A config that fails validation is swapped for the defaults.

use std::time::Duration;

use scrubline_core::animation::{Animation, Tween};
use scrubline_core::geometry::{Point, Size, TimeSpace, snap_width};
use scrubline_core::interaction::{GestureOwner, InteractionContext, KnobSlot, PointerId, PointerTarget};
use scrubline_core::timecode::format_clock;
use scrubline_runtime::{ScrubberConfig, TaskName, TaskScheduler};
use tracing::{debug, debug_span, warn};
use web_time::Instant;

use crate::error::ClipError;
use crate::layout::{Layout, filmstrip_height};
use crate::listener::ScrubberListener;
use crate::playback::{PlaybackSync, PollOutcome};
use crate::player::Player;
use crate::provider::FrameProvider;
use crate::ruler::{Ruler, RulerTick};
use crate::thumbnails::{SlotGeometry, ThumbnailScheduler, VisibleFrame};
use crate::trim::{DragEnd, ResolvedKnobs, TrimController, TrimRange};
use crate::zoom::ZoomController;

pub const ANIMATION_TASK: TaskName = "animation";
pub const EDGE_SCROLL_TASK: TaskName = "edge-scroll";
pub const PLAYBACK_POLL_TASK: TaskName = "playback-poll";

#[derive(Debug, Clone, Copy)]
struct SeekAnimation {
    offset: Tween,
    target: f64,
    resume: bool,
}

/// Timeline scrubber engine.
pub struct Scrubber<P: FrameProvider, Y: Player> {
    config: ScrubberConfig,
    space: TimeSpace,
    ctx: InteractionContext,
    thumbnails: ThumbnailScheduler<P::Image>,
    zoom: ZoomController,
    trim: TrimController,
    playback: PlaybackSync,
    ruler: Ruler,
    tasks: TaskScheduler,
    provider: P,
    player: Y,
    listener: Option<Box<dyn ScrubberListener>>,
    natural_size: Size,
    layout: Option<Layout>,
    seek_animation: Option<SeekAnimation>,
    last_animation_tick: Option<Instant>,
    tap_candidate: Option<KnobSlot>,
}

impl<P: FrameProvider, Y: Player> Scrubber<P, Y> {
    /// Build a scrubber around `provider` and `player`.
    ///
    /// A config that fails [`ScrubberConfig::validate`] is replaced by
    /// [`ScrubberConfig::default`] with a warning.
    #[must_use]
    pub fn new(provider: P, player: Y, config: ScrubberConfig) -> Self {
        let config = config.validated().unwrap_or_else(|err| {
            warn!(error = %err, "invalid scrubber config, using defaults");
            ScrubberConfig::default()
        });
        Self {
            thumbnails: ThumbnailScheduler::new(&config),
            zoom: ZoomController::new(&config),
            trim: TrimController::new(&config),
            playback: PlaybackSync::new(config.loop_playback),
            ruler: Ruler::default(),
            tasks: TaskScheduler::new(),
            space: TimeSpace::default(),
            ctx: InteractionContext::new(),
            provider,
            player,
            listener: None,
            natural_size: Size::default(),
            layout: None,
            seek_animation: None,
            last_animation_tick: None,
            tap_candidate: None,
            config,
        }
    }

    /// Register the outward listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: Box<dyn ScrubberListener>) {
        self.listener = Some(listener);
    }

    fn emit(&mut self, notify: impl FnOnce(&mut dyn ScrubberListener)) {
        if let Some(listener) = self.listener.as_deref_mut() {
            notify(listener);
        }
    }

    fn emit_moved(&mut self, time: f64) {
        self.emit(|listener| listener.on_moved(time));
    }

    fn emit_trim_changed(&mut self) {
        let trim = self.trim.current_trim();
        self.emit(|listener| listener.on_trim_changed(trim.start, trim.end));
    }

    // -- accessors ---------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn space(&self) -> &TimeSpace {
        &self.space
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &InteractionContext {
        &self.ctx
    }

    #[inline]
    #[must_use]
    pub fn thumbnails(&self) -> &ThumbnailScheduler<P::Image> {
        &self.thumbnails
    }

    #[inline]
    #[must_use]
    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    #[inline]
    #[must_use]
    pub fn trim(&self) -> &TrimController {
        &self.trim
    }

    #[inline]
    #[must_use]
    pub fn tasks(&self) -> &TaskScheduler {
        &self.tasks
    }

    #[inline]
    #[must_use]
    pub fn layout_metrics(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    #[inline]
    #[must_use]
    pub fn player(&self) -> &Y {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Y {
        &mut self.player
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.layout.is_some()
    }

    /// Earliest instant a task wants to run.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    // -- clip and layout ---------------------------------------------------

    fn slot_geometry(&self) -> SlotGeometry {
        self.layout.map_or_else(SlotGeometry::default, |layout| SlotGeometry {
            duration: self.space.duration(),
            max_width: layout.max_width,
            thumbnail: layout.thumbnail,
        })
    }

    fn refresh(&mut self, depth: u8, wide: f64, direction: f64) -> usize {
        self.thumbnails
            .request_visible(depth, wide, direction, &self.space, &mut self.provider)
    }

    fn reset_thumbnails(&mut self) {
        let geometry = self.slot_geometry();
        self.thumbnails
            .reset(geometry, self.space.width(), &mut self.provider);
    }

    /// Load a clip of `duration` seconds whose frames are `natural_size`.
    ///
    /// Outstanding frame requests are cancelled, the trim returns to its
    /// default range, and the view starts fully zoomed out at time zero.
    pub fn load_clip(&mut self, duration: f64, natural_size: Size) -> Result<(), ClipError> {
        let _span = debug_span!("load_clip", duration).entered();
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ClipError::InvalidDuration(duration));
        }
        let viewport = *self.space.viewport();
        let layout = Layout::compute(
            &self.config,
            duration,
            natural_size,
            viewport.width,
            viewport.height,
        )?;

        if self.playback.is_active() {
            self.player.pause();
        }
        self.tasks.cancel_all();
        self.ctx.reset();
        self.zoom.cancel();
        self.playback.reset();
        self.seek_animation = None;
        self.last_animation_tick = None;
        self.tap_candidate = None;

        self.space.set_duration(duration);
        self.space.set_bounds(layout.min_width, layout.max_width);
        self.space.set_width(layout.min_width);
        self.space.set_scroll_offset(0.0);
        self.trim.reset(duration, self.config.default_trim_end);
        self.natural_size = natural_size;
        self.layout = Some(layout);

        self.reset_thumbnails();
        let requested = self.refresh(0, 2.0, 0.0);
        debug!(
            min_width = layout.min_width,
            max_width = layout.max_width,
            slots = self.thumbnails.slots().len(),
            requested,
            "clip loaded"
        );
        Ok(())
    }

    /// Host layout pass with the new viewport size.
    ///
    /// The zoom level is carried over in proportion to the thumbnail size
    /// and the playhead stays on the same time.
    pub fn layout(&mut self, viewport_width: f64, viewport_height: f64) -> Result<(), ClipError> {
        let Some(previous) = self.layout else {
            filmstrip_height(viewport_width, viewport_height)?;
            self.space.set_viewport_size(viewport_width, viewport_height);
            return Ok(());
        };
        let next = Layout::compute(
            &self.config,
            self.space.duration(),
            self.natural_size,
            viewport_width,
            viewport_height,
        )?;

        let time = self.space.current_time();
        let rescaled = if previous.thumbnail.width > 0.0 {
            self.space.width() * next.thumbnail.width / previous.thumbnail.width
        } else {
            next.min_width
        };
        self.space.set_viewport_size(viewport_width, viewport_height);
        self.space.set_bounds(next.min_width, next.max_width);
        self.space.set_width(
            snap_width(rescaled, next.max_width)
                .max(next.min_width)
                .min(next.max_width),
        );
        self.space.set_current_time(time);
        self.layout = Some(next);

        self.reset_thumbnails();
        self.refresh(0, 1.0, 0.0);
        debug!(
            width = self.space.width(),
            viewport_width, viewport_height, "layout updated"
        );
        Ok(())
    }

    // -- time --------------------------------------------------------------

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.space.current_time()
    }

    /// Center-line label for the playhead.
    #[must_use]
    pub fn clock_label(&self) -> String {
        format_clock(self.current_time())
    }

    fn show_time(&mut self, time: f64) {
        self.space.set_current_time(time);
        self.refresh(0, 0.0, 0.0);
    }

    /// Host-driven time change. Ignored while the user is interacting
    /// unless `force` is set.
    pub fn set_current_time(&mut self, time: f64, force: bool) {
        if self.ctx.in_action() && !force {
            return;
        }
        self.space.set_current_time(time);
        let current = self.space.current_time();
        self.playback.seek_coalesced(&mut self.player, current);
        self.refresh(0, 0.0, 0.0);
    }

    /// Move the playhead to `time`, optionally easing the scroll there.
    pub fn move_to(&mut self, time: f64, animate: bool, now: Instant) {
        let time = time.max(0.0).min(self.space.duration());
        if !animate {
            self.playback.seek_accurate(&mut self.player, time);
            self.show_time(time);
            return;
        }
        if self.player.is_playing() {
            self.player.pause();
        }
        self.ctx.set_animating(true);
        self.seek_animation = Some(SeekAnimation {
            offset: Tween::new(
                self.space.scroll_offset(),
                self.space.time_to_content(time),
                self.config.trim_settle(),
            ),
            target: time,
            resume: self.playback.is_active(),
        });
        self.start_animation(now);
    }

    fn finish_seek(&mut self, seek: SeekAnimation) {
        self.ctx.set_animating(false);
        self.playback.seek_accurate(&mut self.player, seek.target);
        self.show_time(seek.target);
        if seek.resume {
            self.player.play();
        }
        self.update_manual_flag();
        self.emit_moved(seek.target);
    }

    // -- playback ----------------------------------------------------------

    fn trim_bounds(&self) -> Option<TrimRange> {
        self.trim
            .is_enabled()
            .then(|| self.trim.current_trim())
    }

    fn update_manual_flag(&mut self) {
        let end = self.trim.current_trim().end;
        self.playback
            .update_manual_flag(self.space.current_time(), end);
    }

    /// Start playback, rewinding first if an end was reached.
    pub fn play(&mut self, now: Instant) {
        if !self.is_loaded() {
            return;
        }
        let trim = self.trim_bounds();
        let duration = self.space.duration();
        let playhead = self.space.current_time();
        if let Some(time) = self.playback.play(&mut self.player, playhead, trim, duration) {
            self.show_time(time);
        }
        self.tasks
            .schedule(PLAYBACK_POLL_TASK, self.config.poll_interval(), now);
    }

    /// Pause playback and notify the listener.
    pub fn stop(&mut self) {
        self.playback.stop(&mut self.player);
        self.tasks.cancel(PLAYBACK_POLL_TASK);
        self.emit(|listener| listener.on_stopped());
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback.is_active()
    }

    pub fn set_loop(&mut self, loop_playback: bool) {
        self.playback.set_loop(loop_playback);
    }

    fn step_playback(&mut self) {
        let trim = self.trim_bounds();
        let outcome = self.playback.poll(
            &mut self.player,
            self.ctx.in_action(),
            self.ctx.is_animating(),
            trim,
            self.space.duration(),
        );
        match outcome {
            PollOutcome::Held => {}
            PollOutcome::Looped { time } => self.space.set_current_time(time),
            PollOutcome::Stopped { time } => {
                self.space.set_current_time(time);
                self.stop();
            }
            PollOutcome::Advanced { time, after_loop } => {
                self.show_time(time);
                if after_loop {
                    self.emit_moved(time);
                }
            }
        }
    }

    // -- trim --------------------------------------------------------------

    /// Set the trim range, optionally easing the knobs and moving the
    /// playhead to `seek`.
    pub fn set_trim(&mut self, start: f64, end: f64, seek: Option<f64>, animate: bool, now: Instant) {
        if animate {
            self.trim.settle_to(start, end);
            let target = seek.unwrap_or_else(|| self.current_time());
            self.move_to(target, true, now);
        } else {
            self.trim.set_trim(start, end);
            if let Some(time) = seek {
                self.move_to(time, false, now);
            }
        }
    }

    #[must_use]
    pub fn current_trim(&self) -> TrimRange {
        self.trim.current_trim()
    }

    pub fn set_trim_enabled(&mut self, enabled: bool) {
        self.trim.set_enabled(enabled);
        if enabled {
            self.set_trim_interactive(true);
        }
    }

    pub fn set_trim_visible(&mut self, visible: bool) {
        self.trim.set_visible(visible);
    }

    /// Allow or block knob touches. Activating a disabled trim is ignored.
    pub fn set_trim_interactive(&mut self, active: bool) {
        if active && !self.trim.is_enabled() {
            return;
        }
        self.trim.set_interactive(active);
        if active {
            self.update_manual_flag();
        }
    }

    /// Knob positions to draw, `None` while the trimmer is hidden.
    #[must_use]
    pub fn knobs(&self) -> Option<ResolvedKnobs> {
        (self.is_loaded() && self.trim.is_visible())
            .then(|| self.trim.resolve_visible_positions(&self.space))
    }

    fn begin_drag(&mut self, slot: KnobSlot, x: f64) {
        let current = self.space.current_time();
        self.trim.begin_drag(slot, x, &self.space, current);
        self.ctx.set_owner(GestureOwner::Knob(slot));
    }

    fn update_drag(&mut self, x: f64, now: Instant) {
        let was_scrolling = self.trim.is_edge_scrolling();
        let Some(knob_time) = self.trim.update_drag(x, &self.space, now) else {
            return;
        };
        match (was_scrolling, self.trim.is_edge_scrolling()) {
            (false, true) => {
                self.tasks
                    .schedule(EDGE_SCROLL_TASK, self.config.tick_interval(), now);
            }
            (true, false) => {
                self.tasks.cancel(EDGE_SCROLL_TASK);
            }
            _ => {}
        }
        self.playback.seek_coalesced(&mut self.player, knob_time);
        self.emit_trim_changed();
    }

    fn step_edge_scroll(&mut self, now: Instant) -> Option<()> {
        let step = self.trim.edge_tick(now, &mut self.space)?;
        self.playback.seek_coalesced(&mut self.player, step.knob_time);
        self.refresh(0, 0.0, 0.0);
        if step.finished {
            self.tasks.cancel(EDGE_SCROLL_TASK);
        }
        self.emit_trim_changed();
        Some(())
    }

    fn after_drag(&mut self, end: DragEnd, now: Instant) {
        self.tasks.cancel(EDGE_SCROLL_TASK);
        if self.trim.is_settling() {
            self.start_animation(now);
        }
        let restore = if end.edge_scrolled {
            self.space.current_time()
        } else {
            end.start_current_time
        };
        self.move_to(restore, false, now);
        self.update_manual_flag();
        self.ctx.release(GestureOwner::Knob(end.slot));
        self.emit_trim_changed();
    }

    fn end_drag(&mut self, now: Instant) {
        if let Some(end) = self.trim.end_drag() {
            self.after_drag(end, now);
        }
    }

    fn cancel_drag(&mut self, now: Instant) {
        if let Some(end) = self.trim.cancel_drag() {
            self.after_drag(end, now);
        }
    }

    fn tap(&mut self, slot: KnobSlot, now: Instant) {
        let time = self.trim.time(slot);
        debug!(slot = ?slot, time, "knob tapped");
        self.move_to(time, true, now);
        self.update_manual_flag();
    }

    // -- pinch -------------------------------------------------------------

    fn pinch_start(&mut self, a: Point, b: Point) {
        self.trim.set_interactive(false);
        self.zoom.start(a, b, &self.space);
        self.ctx.set_owner(GestureOwner::Pinch);
    }

    fn pinch_update(&mut self, a: Point, b: Point) {
        if !self.zoom.update(a, b, &mut self.space) {
            return;
        }
        self.thumbnails.update_tiers(self.space.width());
        self.refresh(2, 0.0, 0.0);
        let time = self.space.current_time();
        self.playback.seek_coalesced(&mut self.player, time);
        self.emit_moved(time);
    }

    fn pinch_end(&mut self, now: Instant) {
        if let Some(snapped) = self.zoom.end(&self.space) {
            self.refresh(0, 1.0, 0.0);
            self.thumbnails.update_tolerance(snapped);
            self.set_trim_interactive(true);
            self.start_animation(now);
            let time = self.space.current_time();
            self.emit_moved(time);
        }
        self.ctx.release(GestureOwner::Pinch);
    }

    // -- pointers ----------------------------------------------------------

    pub fn pointer_down(&mut self, id: PointerId, position: Point, _now: Instant) {
        if self.ctx.is_animating() {
            return;
        }
        let target = if self.is_loaded() {
            self.trim
                .hit_test(position.x, &self.space)
                .map_or(PointerTarget::Timeline, PointerTarget::Knob)
        } else {
            PointerTarget::Timeline
        };
        let count = self.ctx.pointer_down(id, position, target);
        self.tap_candidate = None;
        if count == 1 {
            if let PointerTarget::Knob(slot) = target {
                if self.trim.is_draggable(slot, &self.space) {
                    self.begin_drag(slot, position.x);
                }
                self.tap_candidate = Some(slot);
            }
        }
    }

    pub fn pointer_moved(&mut self, id: PointerId, position: Point, now: Instant) {
        if self.ctx.is_animating() || !self.ctx.pointer_moved(id, position) {
            return;
        }
        let count = self.ctx.pointer_count();
        if count > 1 && self.trim.is_dragging() {
            self.cancel_drag(now);
        }
        if count == 2 {
            if let Some((a, b)) = self.ctx.pinch_pair() {
                if self.zoom.is_pinching() {
                    self.pinch_update(a, b);
                } else {
                    self.pinch_start(a, b);
                }
            }
        } else if count == 1 && self.trim.is_dragging() {
            self.update_drag(position.x, now);
        }
        self.tap_candidate = None;
    }

    pub fn pointer_up(&mut self, id: PointerId, now: Instant) {
        if self.ctx.pointer_up(id).is_none() {
            return;
        }
        if self.zoom.is_pinching() && self.ctx.pointer_count() < 2 {
            self.pinch_end(now);
        }
        if self.trim.is_dragging() {
            self.end_drag(now);
        }
        if self.ctx.pointer_count() == 0 {
            if let Some(slot) = self.tap_candidate.take() {
                self.tap(slot, now);
            }
        }
    }

    pub fn pointer_cancel(&mut self, id: PointerId, now: Instant) {
        if self.ctx.pointer_up(id).is_none() {
            return;
        }
        self.tap_candidate = None;
        if self.zoom.is_pinching() {
            self.pinch_end(now);
        }
        if self.trim.is_dragging() {
            self.cancel_drag(now);
        }
    }

    // -- host scrolling ----------------------------------------------------

    pub fn scroll_began(&mut self) {
        if self.zoom.is_pinching() {
            return;
        }
        self.ctx.set_scroll_tracking(true);
        self.ctx.set_owner(GestureOwner::Scroll);
        self.trim.set_interactive(false);
    }

    /// The user panned the timeline to `offset`.
    pub fn scrolled_to(&mut self, offset: f64) {
        if self.zoom.is_pinching() || !self.is_loaded() {
            return;
        }
        self.space.set_scroll_offset(offset);
        self.trim.set_interactive(false);
        let time = self.space.current_time();
        self.playback.seek_coalesced(&mut self.player, time);
        self.refresh(0, 0.0, 0.0);
        self.emit_moved(time);
    }

    pub fn scroll_ended(&mut self, decelerating: bool) {
        self.ctx.set_scroll_tracking(false);
        self.ctx.set_decelerating(decelerating);
        if !decelerating {
            self.finish_scroll();
        }
    }

    pub fn deceleration_ended(&mut self) {
        self.ctx.set_decelerating(false);
        self.finish_scroll();
    }

    fn finish_scroll(&mut self) {
        self.refresh(0, 0.0, 0.0);
        self.set_trim_interactive(true);
        self.ctx.release(GestureOwner::Scroll);
    }

    // -- ticking -----------------------------------------------------------

    fn start_animation(&mut self, now: Instant) {
        if !self.tasks.is_active(ANIMATION_TASK) {
            self.tasks
                .schedule(ANIMATION_TASK, self.config.tick_interval(), now);
            self.last_animation_tick = Some(now);
        }
    }

    fn step_animations(&mut self, now: Instant) {
        let dt = self
            .last_animation_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_animation_tick = Some(now);

        let mut running = false;
        if self.zoom.is_settling() {
            let settling = self.zoom.tick(dt, &mut self.space);
            self.thumbnails.update_tiers(self.space.width());
            if !settling {
                self.refresh(0, 1.0, 0.0);
            }
            running |= settling;
        }
        running |= self.trim.tick(dt);
        if let Some(mut seek) = self.seek_animation.take() {
            seek.offset.tick(dt);
            self.space.set_scroll_offset(seek.offset.current());
            if seek.offset.is_complete() {
                self.finish_seek(seek);
            } else {
                self.seek_animation = Some(seek);
                running = true;
            }
        }
        if !running {
            self.tasks.cancel(ANIMATION_TASK);
            self.last_animation_tick = None;
        }
    }

    /// Drain frame completions and run every task due at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.thumbnails.drain();
        for task in self.tasks.due(now) {
            match task {
                ANIMATION_TASK => self.step_animations(now),
                EDGE_SCROLL_TASK => {
                    if self.step_edge_scroll(now).is_none() {
                        self.tasks.cancel(EDGE_SCROLL_TASK);
                    }
                }
                PLAYBACK_POLL_TASK => self.step_playback(),
                _ => {}
            }
        }
    }

    // -- drawing -----------------------------------------------------------

    /// Thumbnails to draw this frame.
    #[must_use]
    pub fn visible_frames(&self) -> Vec<VisibleFrame> {
        self.thumbnails.visible_frames(&self.space)
    }

    /// Ruler labels for the current view.
    #[must_use]
    pub fn ruler_ticks(&self) -> Vec<RulerTick> {
        self.layout.map_or_else(Vec::new, |layout| {
            self.ruler.ticks(&self.space, layout.max_width, layout.unit)
        })
    }
}

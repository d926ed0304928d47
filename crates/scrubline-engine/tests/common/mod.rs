#![allow(dead_code)]

//! Recording fakes shared by the engine integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use scrubline_core::Size;
use scrubline_engine::{FrameProvider, FrameRequest, FrameSink, Player, Scrubber, ScrubberListener};
use scrubline_runtime::ScrubberConfig;

/// Player that jumps straight to every seek target.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub time: f64,
    pub playing: bool,
    pub seeks: Vec<(f64, f64, f64)>,
}

impl Player for RecordingPlayer {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn seek(&mut self, to: f64, tolerance_before: f64, tolerance_after: f64) {
        self.time = to;
        self.seeks.push((to, tolerance_before, tolerance_after));
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Provider that holds every batch until the test completes it.
#[derive(Debug, Default)]
pub struct ManualFrameProvider {
    pub batches: Vec<(FrameRequest, FrameSink<u32>)>,
    pub cancels: usize,
}

impl ManualFrameProvider {
    /// Every timestamp requested so far, in order.
    pub fn requested(&self) -> Vec<f64> {
        self.batches
            .iter()
            .flat_map(|(request, _)| request.timestamps.iter().copied())
            .collect()
    }

    /// Deliver an image for every pending timestamp. Returns how many
    /// deliveries the engine accepted.
    pub fn complete_all(&mut self) -> usize {
        let mut accepted = 0;
        for (request, sink) in self.batches.drain(..) {
            for (i, t) in request.timestamps.iter().enumerate() {
                if sink.deliver(*t, Ok(i as u32)) {
                    accepted += 1;
                }
            }
        }
        accepted
    }
}

impl FrameProvider for ManualFrameProvider {
    type Image = u32;

    fn request(&mut self, request: FrameRequest, sink: FrameSink<u32>) {
        self.batches.push((request, sink));
    }

    fn cancel_all(&mut self) {
        self.cancels += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Moved(f64),
    TrimChanged(f64, f64),
    Stopped,
}

/// Listener that records into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener(Rc<RefCell<Vec<Event>>>);

impl RecordingListener {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl ScrubberListener for RecordingListener {
    fn on_moved(&mut self, time: f64) {
        self.0.borrow_mut().push(Event::Moved(time));
    }

    fn on_trim_changed(&mut self, start: f64, end: f64) {
        self.0.borrow_mut().push(Event::TrimChanged(start, end));
    }

    fn on_stopped(&mut self) {
        self.0.borrow_mut().push(Event::Stopped);
    }
}

pub type TestScrubber = Scrubber<ManualFrameProvider, RecordingPlayer>;

/// 200 px of content per second at full zoom, 100×80 thumbnails.
pub fn config() -> ScrubberConfig {
    ScrubberConfig {
        duration_per_height: 0.4,
        ..ScrubberConfig::default()
    }
}

pub fn scrubber_with(config: ScrubberConfig) -> TestScrubber {
    let mut scrubber = Scrubber::new(
        ManualFrameProvider::default(),
        RecordingPlayer::default(),
        config,
    );
    scrubber
        .layout(320.0, 100.0)
        .expect("320x100 viewport is valid");
    scrubber
}

/// A loaded 320×100 scrubber with a recording listener attached.
///
/// For a 10 s clip: max width 2000, min width 250 (25 px/s), 20 slots.
pub fn loaded(duration: f64) -> (TestScrubber, RecordingListener) {
    loaded_with(config(), duration)
}

pub fn loaded_with(config: ScrubberConfig, duration: f64) -> (TestScrubber, RecordingListener) {
    let mut scrubber = scrubber_with(config);
    scrubber
        .load_clip(duration, Size::new(100.0, 80.0))
        .expect("clip is valid");
    let listener = RecordingListener::default();
    scrubber.set_listener(Box::new(listener.clone()));
    (scrubber, listener)
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

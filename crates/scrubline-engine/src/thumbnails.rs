#![forbid(unsafe_code)]

//! Thumbnail slots, level-of-detail tiers, and the visible-range request
//! policy.
//!
//! The filmstrip is sampled at `slot_count = ceil(max_width / thumb_width)`
//! discrete slots. Only a subset is ever requested: slots are partitioned
//! into four tiers by the current zoom, and each request pass asks for the
//! tiers its `depth` allows, restricted to the visible index range plus a
//! margin.
//!
//! # State Machine
//!
//! Per slot: `Empty → Requested → Ready`, and `Ready → Stale → Requested`
//! once the zoom demands a tighter tolerance than the image was fetched with.
//! A failed fetch returns the slot to `Empty` (or back to `Stale`).
//!
//! # Invariants
//!
//! 1. `upon ∪ below ∪ deep ∪ hidden` is exactly `[0, slot_count)`, with no
//!    index in two tiers.
//! 2. A slot that is `Requested` is never part of another batch until its
//!    completion is drained, successful or not.
//! 3. Completions from a batch issued before the last `reset` are dropped.
//!
//! # Failure Modes
//!
//! - Zero thumbnail width or content width: no slots, no requests.
//! - A completion whose timestamp maps outside the slot range is ignored.

use std::sync::mpsc::{self, Receiver, Sender};

use scrubline_core::geometry::{Size, TimeSpace, round_half_up};
use scrubline_runtime::{CancellationSource, ScrubberConfig};
use tracing::{debug, trace};

use crate::provider::{FrameCompletion, FrameProvider, FrameRequest, FrameSink};

/// Largest key-division exponent; keeps `1 << n` in range on every target.
const MAX_KEY_EXPONENT: f64 = 30.0;

// ---------------------------------------------------------------------------
// Slot geometry
// ---------------------------------------------------------------------------

/// Where slots sit in time and content space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlotGeometry {
    pub duration: f64,
    /// Content width at the finest zoom.
    pub max_width: f64,
    /// Drawn thumbnail size.
    pub thumbnail: Size,
}

impl SlotGeometry {
    /// Fractional number of thumbnails spanning the fully zoomed-in clip.
    #[must_use]
    pub fn count_f(&self) -> f64 {
        let count = self.max_width / self.thumbnail.width;
        if count.is_finite() && count > 0.0 {
            count
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.count_f().ceil() as usize
    }

    /// Sample time of slot `index`.
    #[must_use]
    pub fn slot_time(&self, index: usize) -> f64 {
        let count = self.count_f();
        if count <= 0.0 {
            return 0.0;
        }
        self.duration * index as f64 / count
    }

    /// Nearest slot to `time` (halves round up), if it exists.
    #[must_use]
    pub fn slot_for_time(&self, time: f64) -> Option<usize> {
        let count = self.count_f();
        if count <= 0.0 || self.duration <= 0.0 || !time.is_finite() {
            return None;
        }
        let index = round_half_up(time * count / self.duration);
        if index < 0.0 || index >= self.slot_count() as f64 {
            return None;
        }
        Some(index as usize)
    }

    /// Content position of slot `index` at content width `width`.
    #[must_use]
    pub fn slot_position(&self, index: usize, width: f64) -> f64 {
        let count = self.count_f();
        if count <= 0.0 {
            return 0.0;
        }
        width * index as f64 / count
    }
}

/// Inclusive index range of slots near the viewport.
///
/// The left bound carries an extra thumbnail of margin. Positions map to
/// indices by rounding to nearest with halves rounding up, then clamp into
/// `[0, slot_count - 1]`.
#[must_use]
pub fn visible_range(geometry: &SlotGeometry, space: &TimeSpace) -> Option<(usize, usize)> {
    let count = geometry.slot_count();
    let width = space.width();
    if count == 0 || width <= 0.0 {
        return None;
    }
    let count_f = geometry.count_f();
    let index = |position: f64| round_half_up(position * count_f / width) as i64;

    let half = space.viewport_width() / 2.0;
    let offset = space.scroll_offset();
    let thumb = geometry.thumbnail.width;
    let last = count as i64 - 1;

    let left = (index(offset - half - thumb) - 1).clamp(0, last);
    let right = index(offset + half + thumb).clamp(0, last);
    Some((left as usize, right.max(left) as usize))
}

// ---------------------------------------------------------------------------
// Detail tiers
// ---------------------------------------------------------------------------

/// Level-of-detail bucket of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Coarsest regular grid, always drawn.
    Upon,
    /// Half-step interstitials, drawn beneath `Upon`.
    Below,
    /// Quarter-step interstitials, fetched only when zooming.
    Deep,
    Hidden,
}

/// Partition of `[0, slot_count)` into the four tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailTiers {
    key_division: usize,
    upon: Vec<usize>,
    below: Vec<usize>,
    deep: Vec<usize>,
    hidden: Vec<usize>,
}

impl DetailTiers {
    #[inline]
    #[must_use]
    pub const fn key_division(&self) -> usize {
        self.key_division
    }

    /// Sorted indices in `tier`.
    #[must_use]
    pub fn indices(&self, tier: Tier) -> &[usize] {
        match tier {
            Tier::Upon => &self.upon,
            Tier::Below => &self.below,
            Tier::Deep => &self.deep,
            Tier::Hidden => &self.hidden,
        }
    }

    /// Tier of slot `index`, `None` if out of range.
    #[must_use]
    pub fn tier(&self, index: usize) -> Option<Tier> {
        [Tier::Upon, Tier::Below, Tier::Deep, Tier::Hidden]
            .into_iter()
            .find(|tier| self.indices(*tier).binary_search(&index).is_ok())
    }

    /// Total number of slots partitioned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upon.len() + self.below.len() + self.deep.len() + self.hidden.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key_division(width: f64, max_width: f64) -> usize {
    let ratio = 2.0 * max_width / (width + 1.0);
    if ratio.is_nan() || ratio < 2.0 {
        return 1;
    }
    let exponent = ratio.log2().floor().min(MAX_KEY_EXPONENT);
    1usize << (exponent as u32)
}

/// Partition the slots for content width `width`.
///
/// `key_division = 2^floor(log2(2·max_width / (width + 1)))`. `upon` holds
/// every `key_division`-th slot, `below` the midpoints between consecutive
/// `upon` slots (when `key_division ≥ 2`), `deep` a quarter step past every
/// non-final `upon ∪ below` slot (when `key_division ≥ 4`), and `hidden`
/// the rest.
#[must_use]
pub fn compute_tiers(width: f64, max_width: f64, slot_count: usize) -> DetailTiers {
    if slot_count == 0 {
        return DetailTiers::default();
    }
    let key_division = key_division(width, max_width);
    let key_count = (slot_count - 1) / key_division + 1;
    let half = key_division / 2;
    let quarter = half / 2;

    let upon: Vec<usize> = (0..key_count).map(|i| i * key_division).collect();
    let below: Vec<usize> = if half >= 1 {
        (0..key_count - 1).map(|i| i * key_division + half).collect()
    } else {
        Vec::new()
    };

    let deep: Vec<usize> = if quarter >= 1 {
        let mut shown: Vec<usize> = upon.iter().chain(&below).copied().collect();
        shown.sort_unstable();
        let last = shown.last().copied().unwrap_or(0);
        shown
            .into_iter()
            .filter(|index| *index < last)
            .map(|index| index + quarter)
            .collect()
    } else {
        Vec::new()
    };

    let mut claimed = vec![false; slot_count];
    for index in upon.iter().chain(&below).chain(&deep) {
        if let Some(flag) = claimed.get_mut(*index) {
            *flag = true;
        }
    }
    let hidden = claimed
        .iter()
        .enumerate()
        .filter_map(|(index, taken)| (!taken).then_some(index))
        .collect();

    DetailTiers {
        key_division,
        upon,
        below,
        deep,
        hidden,
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Scheduling state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Requested,
    Ready,
    Stale,
}

/// One thumbnail sampling position.
#[derive(Debug, Clone)]
pub struct ThumbnailSlot<I> {
    image: Option<I>,
    fetched_tolerance: Option<f64>,
    pending_tolerance: Option<f64>,
}

impl<I> ThumbnailSlot<I> {
    fn empty() -> Self {
        Self {
            image: None,
            fetched_tolerance: None,
            pending_tolerance: None,
        }
    }

    #[must_use]
    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    /// Tolerance the current image was fetched with.
    #[must_use]
    pub fn fetched_tolerance(&self) -> Option<f64> {
        self.fetched_tolerance
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.pending_tolerance.is_some()
    }

    fn is_stale(&self, tolerance: f64, stale_factor: f64) -> bool {
        self.fetched_tolerance
            .is_some_and(|fetched| fetched > tolerance * stale_factor)
    }

    /// State given the tolerance the current zoom demands.
    #[must_use]
    pub fn state(&self, tolerance: f64, stale_factor: f64) -> SlotState {
        if self.is_requested() {
            SlotState::Requested
        } else if self.image.is_none() {
            SlotState::Empty
        } else if self.is_stale(tolerance, stale_factor) {
            SlotState::Stale
        } else {
            SlotState::Ready
        }
    }

    fn needs_fetch(&self, tolerance: f64, stale_factor: f64) -> bool {
        matches!(
            self.state(tolerance, stale_factor),
            SlotState::Empty | SlotState::Stale
        )
    }
}

/// A slot to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleFrame {
    pub index: usize,
    /// Screen x of the slot's left edge.
    pub x: f64,
    pub tier: Tier,
}

// ---------------------------------------------------------------------------
// ThumbnailScheduler
// ---------------------------------------------------------------------------

/// Decides which slots to fetch and applies provider completions.
#[derive(Debug)]
pub struct ThumbnailScheduler<I> {
    geometry: SlotGeometry,
    slots: Vec<ThumbnailSlot<I>>,
    tiers: DetailTiers,
    tolerance: f64,
    stale_factor: f64,
    oversample: f64,
    generation: u64,
    batch: CancellationSource,
    sender: Sender<FrameCompletion<I>>,
    receiver: Receiver<FrameCompletion<I>>,
}

impl<I> ThumbnailScheduler<I> {
    #[must_use]
    pub fn new(config: &ScrubberConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            geometry: SlotGeometry::default(),
            slots: Vec::new(),
            tiers: DetailTiers::default(),
            tolerance: config.initial_tolerance,
            stale_factor: config.stale_factor,
            oversample: config.thumbnail_oversample,
            generation: 0,
            batch: CancellationSource::new(),
            sender,
            receiver,
        }
    }

    /// Discard every slot, cancel outstanding requests, and rebuild the
    /// slots for `geometry` at content width `width`.
    pub fn reset<P>(&mut self, geometry: SlotGeometry, width: f64, provider: &mut P)
    where
        P: FrameProvider<Image = I>,
    {
        self.batch.cancel();
        self.batch = CancellationSource::new();
        provider.cancel_all();
        self.generation = self.generation.wrapping_add(1);

        self.geometry = geometry;
        let count = geometry.slot_count();
        self.slots = (0..count).map(|_| ThumbnailSlot::empty()).collect();
        self.tiers = compute_tiers(width, geometry.max_width, count);
        debug!(
            generation = self.generation,
            slots = count,
            key_division = self.tiers.key_division(),
            "thumbnail slots reset"
        );
    }

    /// Recompute the tier partition for a new content width.
    pub fn update_tiers(&mut self, width: f64) {
        self.tiers = compute_tiers(width, self.geometry.max_width, self.slots.len());
    }

    /// Tolerance for content width `width`: twice the time one thumbnail
    /// spans at that zoom.
    pub fn update_tolerance(&mut self, width: f64) {
        if width <= 0.0 || self.geometry.duration <= 0.0 {
            return;
        }
        self.tolerance = (self.geometry.thumbnail.width / width) * self.geometry.duration * 2.0;
        trace!(tolerance = self.tolerance, "frame tolerance updated");
    }

    #[inline]
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    #[must_use]
    pub const fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    #[inline]
    #[must_use]
    pub const fn tiers(&self) -> &DetailTiers {
        &self.tiers
    }

    #[must_use]
    pub fn slots(&self) -> &[ThumbnailSlot<I>] {
        &self.slots
    }

    #[must_use]
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots
            .get(index)
            .map(|slot| slot.state(self.tolerance, self.stale_factor))
    }

    /// Current request generation; bumped by every `reset`.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of slots waiting on the provider.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_requested()).count()
    }

    /// Request the slots near the viewport.
    ///
    /// `depth` 0 considers `upon` only, 1 adds `below`, 2 adds `deep`.
    /// `wide` widens the margin in multiples of the visible span; a positive
    /// `direction` narrows the left margin and a negative one the right.
    /// Returns the number of slots requested.
    pub fn request_visible<P>(
        &mut self,
        depth: u8,
        wide: f64,
        direction: f64,
        space: &TimeSpace,
        provider: &mut P,
    ) -> usize
    where
        P: FrameProvider<Image = I>,
    {
        let Some((left, right)) = visible_range(&self.geometry, space) else {
            return 0;
        };
        let (left, right) = (left as i64, right as i64);
        let span = right - left;
        let spanf = span as f64;

        let mut add_left = (spanf * wide) as i64;
        let mut add_right = add_left;
        if direction > 0.0 {
            add_left = (-spanf * direction) as i64;
        } else if direction < 0.0 {
            add_right = (spanf * direction) as i64;
        }

        let below_left = (add_left as f64 * 0.5) as i64 - (spanf * 0.7) as i64;
        let below_right = (add_right as f64 * 0.5) as i64 - (spanf * 0.7) as i64;
        let deep_left = (add_left as f64 * 0.2) as i64 - (spanf * 0.4) as i64;
        let deep_right = (add_right as f64 * 0.2) as i64 - (spanf * 0.4) as i64;

        let mut passes = vec![(Tier::Upon, add_left, add_right)];
        if depth > 0 {
            passes.push((Tier::Below, below_left, below_right));
        }
        if depth > 1 {
            passes.push((Tier::Deep, deep_left, deep_right));
        }

        let mut picked = Vec::new();
        for (tier, margin_left, margin_right) in passes {
            let low = left - margin_left;
            let high = right + margin_right;
            for &index in self.tiers.indices(tier) {
                let i = index as i64;
                if i < low || i > high {
                    continue;
                }
                let Some(slot) = self.slots.get_mut(index) else {
                    continue;
                };
                if slot.needs_fetch(self.tolerance, self.stale_factor) {
                    slot.pending_tolerance = Some(self.tolerance);
                    picked.push(index);
                }
            }
        }

        if picked.is_empty() {
            return 0;
        }
        let timestamps: Vec<f64> = picked
            .iter()
            .map(|index| self.geometry.slot_time(*index))
            .collect();
        trace!(
            depth,
            left,
            right,
            count = timestamps.len(),
            tolerance = self.tolerance,
            "thumbnail batch"
        );
        let request = FrameRequest {
            timestamps,
            tolerance: self.tolerance,
            max_size: self.geometry.thumbnail.scaled(self.oversample),
        };
        provider.request(request, self.sink());
        picked.len()
    }

    fn sink(&self) -> FrameSink<I> {
        FrameSink::new(self.sender.clone(), self.generation, self.batch.token())
    }

    /// Apply every completion delivered so far. Returns the number of
    /// images stored.
    pub fn drain(&mut self) -> usize {
        let mut stored = 0;
        while let Ok(done) = self.receiver.try_recv() {
            if done.generation != self.generation {
                trace!(generation = done.generation, "dropping completion from old batch");
                continue;
            }
            let Some(index) = self.geometry.slot_for_time(done.timestamp) else {
                continue;
            };
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };
            let tolerance = slot.pending_tolerance.take().unwrap_or(self.tolerance);
            match done.result {
                Ok(image) => {
                    slot.image = Some(image);
                    slot.fetched_tolerance = Some(tolerance);
                    stored += 1;
                }
                Err(err) => {
                    debug!(slot = index, error = %err, "frame request failed");
                }
            }
        }
        stored
    }

    /// Slots to draw, `below` first so `upon` covers it.
    #[must_use]
    pub fn visible_frames(&self, space: &TimeSpace) -> Vec<VisibleFrame> {
        let Some((left, right)) = visible_range(&self.geometry, space) else {
            return Vec::new();
        };
        [Tier::Below, Tier::Upon]
            .into_iter()
            .flat_map(|tier| {
                self.tiers
                    .indices(tier)
                    .iter()
                    .filter(move |index| (left..=right).contains(*index))
                    .map(move |&index| VisibleFrame {
                        index,
                        x: space.content_to_screen(self.geometry.slot_position(index, space.width())),
                        tier,
                    })
            })
            .collect()
    }
}

//! Property tests for the engine's geometric and scheduling invariants.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use scrubline_core::geometry::{ContentSpace, Point, Size, TimeSpace, Viewport};
use scrubline_core::KnobSlot;
use scrubline_engine::{
    FrameProvider, FrameRequest, FrameSink, SlotGeometry, ThumbnailScheduler, Tier, TrimController,
    TrimRole, ZoomController, compute_tiers, pinch_width,
};
use scrubline_runtime::ScrubberConfig;
use web_time::Instant;

const MIN_WIDTH: f64 = 250.0;
const MAX_WIDTH: f64 = 2000.0;
const LONG: Duration = Duration::from_secs(1);

fn space(width: f64, offset: f64) -> TimeSpace {
    TimeSpace::new(
        10.0,
        ContentSpace::new(width, MIN_WIDTH, MAX_WIDTH),
        Viewport {
            scroll_offset: offset,
            width: 320.0,
            height: 100.0,
        },
    )
}

#[derive(Default)]
struct Recorder {
    timestamps: Vec<f64>,
}

impl FrameProvider for Recorder {
    type Image = u32;

    fn request(&mut self, request: FrameRequest, _sink: FrameSink<u32>) {
        self.timestamps.extend(request.timestamps);
    }

    fn cancel_all(&mut self) {}
}

fn is_ladder_width(width: f64) -> bool {
    (0..=12).any(|k| (width - MAX_WIDTH / f64::from(1u32 << k)).abs() < 1e-9)
        || (width - MIN_WIDTH).abs() < 1e-9
}

// ── Detail tiers ─────────────────────────────────────────────────────────

#[test]
fn full_zoom_puts_every_slot_on_top() {
    let tiers = compute_tiers(MAX_WIDTH, MAX_WIDTH, 17);
    assert_eq!(tiers.key_division(), 1);
    assert_eq!(tiers.indices(Tier::Upon), (0..17).collect::<Vec<_>>().as_slice());
    assert!(tiers.indices(Tier::Below).is_empty());
    assert!(tiers.indices(Tier::Hidden).is_empty());
}

proptest! {
    #[test]
    fn tiers_partition_every_slot(
        slot_count in 1usize..300,
        width in MIN_WIDTH / 4.0..=MAX_WIDTH,
    ) {
        let tiers = compute_tiers(width, MAX_WIDTH, slot_count);
        let mut seen = vec![0u8; slot_count];
        for tier in [Tier::Upon, Tier::Below, Tier::Deep, Tier::Hidden] {
            let indices = tiers.indices(tier);
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            for &i in indices {
                prop_assert!(i < slot_count);
                seen[i] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
        prop_assert_eq!(tiers.len(), slot_count);
        prop_assert_eq!(tiers.indices(Tier::Upon).first(), Some(&0));
        prop_assert!(tiers.key_division().is_power_of_two());
    }
}

// ── Zoom bounds ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pinch_width_stays_in_bounds(
        start in MIN_WIDTH..=MAX_WIDTH,
        scale in 0.0f64..20.0,
    ) {
        let width = pinch_width(start, scale, MIN_WIDTH, MAX_WIDTH);
        prop_assert!(width >= MIN_WIDTH && width <= MAX_WIDTH);
        prop_assert_eq!(pinch_width(start, 0.0, MIN_WIDTH, MAX_WIDTH), MIN_WIDTH);
    }

    #[test]
    fn pinch_sequence_settles_on_ladder(
        start_width in MIN_WIDTH..=MAX_WIDTH,
        moves in prop::collection::vec((0.0f64..320.0, 0.0f64..320.0), 1..12),
    ) {
        let mut space = space(start_width, start_width / 2.0);
        let mut zoom = ZoomController::new(&ScrubberConfig::default());
        zoom.start(Point::new(100.0, 50.0), Point::new(200.0, 50.0), &space);
        for (ax, bx) in moves {
            prop_assert!(zoom.update(Point::new(ax, 50.0), Point::new(bx, 50.0), &mut space));
            prop_assert!(space.width() >= MIN_WIDTH && space.width() <= MAX_WIDTH);
            prop_assert!(space.scroll_offset() >= 0.0 && space.scroll_offset() <= space.width());
        }
        let snapped = zoom.end(&space).unwrap();
        prop_assert!(is_ladder_width(snapped));
        prop_assert!(!zoom.tick(LONG, &mut space));
        prop_assert!((space.width() - snapped).abs() < 1e-9);
    }
}

// ── Knob separation ──────────────────────────────────────────────────────

fn trim_with(passthrough: bool, start: f64, end: f64) -> TrimController {
    let config = ScrubberConfig {
        passthrough,
        ..ScrubberConfig::default()
    };
    let mut trim = TrimController::new(&config);
    trim.reset(10.0, 3.0);
    trim.set_trim(start, end);
    trim
}

fn separation(trim: &TrimController) -> f64 {
    trim.time_of(TrimRole::End) - trim.time_of(TrimRole::Start)
}

proptest! {
    #[test]
    fn blocked_knobs_never_close_the_gap(
        start in 0.0f64..9.0,
        gap in 0.1f64..1.0,
        second in any::<bool>(),
        xs in prop::collection::vec(50.0f64..270.0, 1..16),
    ) {
        let end = (start + gap).min(10.0);
        let space = space(800.0, 200.0);
        let mut trim = trim_with(false, start, end);
        let slot = if second { KnobSlot::Second } else { KnobSlot::First };
        trim.begin_drag(slot, 160.0, &space, 2.5);
        let now = Instant::now();
        for x in xs {
            trim.update_drag(x, &space, now);
            prop_assert!(separation(&trim) >= 0.1 - 1e-9);
        }
    }

    #[test]
    fn released_knobs_settle_apart(
        start in 0.0f64..10.0,
        end in 0.0f64..10.0,
        second in any::<bool>(),
        xs in prop::collection::vec(50.0f64..270.0, 1..16),
    ) {
        let space = space(800.0, 200.0);
        let mut trim = trim_with(true, start.min(end), start.max(end));
        let slot = if second { KnobSlot::Second } else { KnobSlot::First };
        trim.begin_drag(slot, 160.0, &space, 2.5);
        let now = Instant::now();
        for x in xs {
            trim.update_drag(x, &space, now);
        }
        trim.end_drag();
        trim.tick(LONG);
        let range = trim.current_trim();
        prop_assert!(range.end - range.start >= 0.1 - 1e-9);
        prop_assert!(range.start >= -1e-9 && range.end <= 10.0 + 1e-9);
    }
}

// ── Frame requests ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pending_slots_are_never_requested_twice(
        passes in prop::collection::vec(
            (0u8..3, 0.0f64..3.0, -1.0f64..1.0, MIN_WIDTH..=MAX_WIDTH, 0.0f64..1.0),
            1..10,
        ),
    ) {
        let geometry = SlotGeometry {
            duration: 10.0,
            max_width: MAX_WIDTH,
            thumbnail: Size::new(100.0, 80.0),
        };
        let mut provider = Recorder::default();
        let mut scheduler: ThumbnailScheduler<u32> =
            ThumbnailScheduler::new(&ScrubberConfig::default());
        scheduler.reset(geometry, MIN_WIDTH, &mut provider);

        for (depth, wide, direction, width, position) in passes {
            let space = space(width, width * position);
            scheduler.update_tiers(width);
            scheduler.request_visible(depth, wide, direction, &space, &mut provider);
        }

        let mut seen = HashSet::new();
        for t in &provider.timestamps {
            prop_assert!(seen.insert(t.to_bits()), "timestamp {} requested twice", t);
        }
        prop_assert_eq!(scheduler.in_flight(), provider.timestamps.len());
    }
}

#![forbid(unsafe_code)]

//! Time ruler above the filmstrip.
//!
//! Labels sit on a power-of-two grid of seconds: the label step doubles
//! until consecutive labels are more than [`MIN_LABEL_SPACING`] pixels
//! apart at the current zoom.

use scrubline_core::geometry::TimeSpace;
use scrubline_core::timecode::format_ruler;

/// Minimum distance between ruler labels, in pixels.
pub const MIN_LABEL_SPACING: f64 = 80.0;

const MAX_DOUBLINGS: i32 = 1000;
const MIN_RULER_HEIGHT: f64 = 10.0;
const RULER_HEIGHT_RATIO: f64 = 0.2;

/// Marks drawn between two labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinorMarks {
    /// A centered dash, used at one-second steps.
    Dash { from: f64, to: f64 },
    /// Quarter-step dots.
    Dots([f64; 3]),
}

/// One labelled ruler position.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    /// Screen x.
    pub x: f64,
    pub seconds: f64,
    pub label: String,
    /// Marks between this label and the next.
    pub minor: MinorMarks,
}

/// Ruler layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruler {
    min_label_spacing: f64,
}

impl Default for Ruler {
    fn default() -> Self {
        Self {
            min_label_spacing: MIN_LABEL_SPACING,
        }
    }
}

impl Ruler {
    /// Height reserved for the ruler in a viewport of `viewport_height`.
    #[must_use]
    pub fn height_for(viewport_height: f64) -> f64 {
        (RULER_HEIGHT_RATIO * viewport_height).max(MIN_RULER_HEIGHT)
    }

    /// Pixel distance between labels and the doubling count `d`; the
    /// label step is `2^d` seconds.
    ///
    /// `unit` is content pixels per second at the finest zoom.
    #[must_use]
    pub fn spacing(&self, width: f64, max_width: f64, unit: f64) -> Option<(f64, i32)> {
        let mut step = (width / max_width) * unit;
        if !(step.is_finite() && step > 0.0) {
            return None;
        }
        let mut doublings = 0;
        while step <= self.min_label_spacing && doublings < MAX_DOUBLINGS {
            step *= 2.0;
            doublings += 1;
        }
        Some((step, doublings))
    }

    /// Labels covering the viewport, one step of margin on each side.
    #[must_use]
    pub fn ticks(&self, space: &TimeSpace, max_width: f64, unit: f64) -> Vec<RulerTick> {
        let width = space.width();
        let Some((step, doublings)) = self.spacing(width, max_width, unit) else {
            return Vec::new();
        };
        let seconds_per_step = 2f64.powi(doublings);
        let (left, right) = space.visible_content();
        let first = ((left / step).floor() - 1.0).max(0.0) as u64;
        let last = ((right / step).ceil() + 1.0).max(0.0) as u64;
        let limit = width + width.abs() * 1e-9;

        let mut ticks = Vec::new();
        for i in first..=last {
            let content = i as f64 * step;
            if content > limit {
                break;
            }
            let x = space.content_to_screen(content);
            let seconds = i as f64 * seconds_per_step;
            let minor = if doublings == 0 {
                let center = x + step / 2.0;
                let half = self.min_label_spacing / 4.0;
                MinorMarks::Dash {
                    from: center - half,
                    to: center + half,
                }
            } else {
                MinorMarks::Dots([x + step / 4.0, x + step / 2.0, x + step * 3.0 / 4.0])
            };
            ticks.push(RulerTick {
                x,
                seconds,
                label: format_ruler(seconds),
                minor,
            });
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubline_core::geometry::{ContentSpace, Viewport};

    fn space(width: f64, offset: f64) -> TimeSpace {
        TimeSpace::new(
            8.0,
            ContentSpace::new(width, 100.0, 800.0),
            Viewport {
                scroll_offset: offset,
                width: 320.0,
                height: 100.0,
            },
        )
    }

    #[test]
    fn ruler_height() {
        assert_eq!(Ruler::height_for(100.0), 20.0);
        assert_eq!(Ruler::height_for(30.0), 10.0);
    }

    #[test]
    fn spacing_doubles_until_wide_enough() {
        let ruler = Ruler::default();
        assert_eq!(ruler.spacing(800.0, 800.0, 100.0), Some((100.0, 0)));
        assert_eq!(ruler.spacing(800.0, 800.0, 80.0), Some((160.0, 1)));
        assert_eq!(ruler.spacing(200.0, 800.0, 100.0), Some((100.0, 2)));
        assert_eq!(ruler.spacing(0.0, 800.0, 100.0), None);
    }

    #[test]
    fn one_second_labels_at_full_zoom() {
        let ticks = Ruler::default().ticks(&space(800.0, 400.0), 800.0, 100.0);
        let seconds: Vec<f64> = ticks.iter().map(|t| t.seconds).collect();
        assert_eq!(seconds, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(ticks[0].x, -140.0);
        assert_eq!(ticks[2].label, "00:03");
        assert_eq!(
            ticks[0].minor,
            MinorMarks::Dash {
                from: -110.0,
                to: -70.0
            }
        );
    }

    #[test]
    fn zoomed_out_labels_stop_at_content_end() {
        let ticks = Ruler::default().ticks(&space(200.0, 100.0), 800.0, 100.0);
        let seconds: Vec<f64> = ticks.iter().map(|t| t.seconds).collect();
        assert_eq!(seconds, vec![0.0, 4.0, 8.0]);
        assert_eq!(ticks[1].minor, MinorMarks::Dots([185.0, 210.0, 235.0]));
    }
}

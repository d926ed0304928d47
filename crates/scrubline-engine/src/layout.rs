#![forbid(unsafe_code)]

//! Layout pass: thumbnail size and zoom bounds for a viewport.

use scrubline_core::geometry::{Size, snap_width};
use scrubline_runtime::ScrubberConfig;

use crate::error::ClipError;
use crate::ruler::Ruler;

/// Geometry derived from the clip and the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Drawn thumbnail size, fitted to the filmstrip height.
    pub thumbnail: Size,
    pub ruler_height: f64,
    /// Content pixels per second at the finest zoom.
    pub unit: f64,
    pub min_width: f64,
    pub max_width: f64,
}

/// Filmstrip height left under the ruler, if the viewport can hold one.
pub fn filmstrip_height(viewport_width: f64, viewport_height: f64) -> Result<f64, ClipError> {
    let film = viewport_height - Ruler::height_for(viewport_height);
    if viewport_width > 0.0 && film > 0.0 && viewport_width.is_finite() && film.is_finite() {
        Ok(film)
    } else {
        Err(ClipError::InvalidViewport {
            width: viewport_width,
            height: viewport_height,
        })
    }
}

impl Layout {
    /// Fit a clip of `duration` seconds whose frames are `natural` pixels
    /// into a `viewport_width × viewport_height` viewport.
    ///
    /// The fully zoomed-out clip fills `min_width_ratio` of the viewport,
    /// or the whole max width when that is already narrower.
    pub fn compute(
        config: &ScrubberConfig,
        duration: f64,
        natural: Size,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Result<Self, ClipError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ClipError::InvalidDuration(duration));
        }
        if natural.is_empty() || !natural.width.is_finite() || !natural.height.is_finite() {
            return Err(ClipError::InvalidThumbnailSize);
        }
        let film = filmstrip_height(viewport_width, viewport_height)?;
        let thumbnail = natural.fit_height(film);
        if thumbnail.is_empty() || !thumbnail.width.is_finite() {
            return Err(ClipError::InvalidThumbnailSize);
        }

        let unit = thumbnail.height / config.duration_per_height;
        let max_width = unit * duration;
        let candidate = config.min_width_ratio * viewport_width;
        let min_width = if max_width <= candidate {
            max_width
        } else {
            snap_width(candidate, max_width)
        };

        Ok(Self {
            thumbnail,
            ruler_height: viewport_height - film,
            unit,
            min_width,
            max_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(duration: f64, vw: f64, vh: f64) -> Result<Layout, ClipError> {
        Layout::compute(
            &ScrubberConfig::default(),
            duration,
            Size::new(160.0, 90.0),
            vw,
            vh,
        )
    }

    #[test]
    fn long_clip_snaps_min_width() {
        let layout = compute(10.0, 320.0, 100.0).unwrap();
        assert_eq!(layout.ruler_height, 20.0);
        assert_eq!(layout.thumbnail.height, 80.0);
        assert!((layout.thumbnail.width - 142.222_222).abs() < 1e-3);
        assert!((layout.unit - 80.0 / 0.35).abs() < 1e-9);
        assert!((layout.max_width - 800.0 / 0.35).abs() < 1e-9);
        assert!((layout.min_width - layout.max_width / 8.0).abs() < 1e-9);
    }

    #[test]
    fn short_clip_cannot_zoom() {
        let layout = compute(0.5, 320.0, 100.0).unwrap();
        assert_eq!(layout.min_width, layout.max_width);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            compute(0.0, 320.0, 100.0),
            Err(ClipError::InvalidDuration(0.0))
        );
        assert_eq!(
            compute(10.0, 320.0, 0.0),
            Err(ClipError::InvalidViewport {
                width: 320.0,
                height: 0.0
            })
        );
        assert_eq!(
            Layout::compute(
                &ScrubberConfig::default(),
                10.0,
                Size::new(0.0, 90.0),
                320.0,
                100.0
            ),
            Err(ClipError::InvalidThumbnailSize)
        );
    }
}

use marker_scan_common::frame::Rect;
use tracing::trace;

use super::traits::InteriorClassifier;
use super::{Rejection, Verdict};
use crate::region::{mean, RegionSampler};

/// Dark frame around a light background that holds a dark glyph.
///
/// Two stages, both must pass:
/// 1. the interior grid mean is at least `min_background_mean`;
/// 2. within the central square, the share of pixels darker than
///    `dark_level` lies in `[min_dark_ratio, max_dark_ratio]`.
///
/// The default lower bound is 0, so a blank interior passes stage 2.
#[derive(Debug, Clone, Copy)]
pub struct BoundedDarkShape {
    pub min_background_mean: f64,
    pub dark_level: u8,
    pub min_dark_ratio: f64,
    pub max_dark_ratio: f64,
}

impl Default for BoundedDarkShape {
    fn default() -> Self {
        Self {
            min_background_mean: 100.0,
            dark_level: 50,
            min_dark_ratio: 0.0,
            max_dark_ratio: 0.5,
        }
    }
}

impl BoundedDarkShape {
    pub fn judge_background(&self, samples: &[u8]) -> Verdict {
        match mean(samples) {
            None => Verdict::Rejected(Rejection::InteriorEmpty),
            Some(avg) => Verdict::check(
                avg >= self.min_background_mean,
                Rejection::BackgroundTooDark,
            ),
        }
    }

    pub fn judge_shape(&self, window: &[u8]) -> Verdict {
        if window.is_empty() {
            return Verdict::Rejected(Rejection::ShapeWindowEmpty);
        }
        let dark = window.iter().filter(|&&v| v < self.dark_level).count();
        let ratio = dark as f64 / window.len() as f64;
        trace!(dark, total = window.len(), ratio, "central dark ratio");
        Verdict::check(
            (self.min_dark_ratio..=self.max_dark_ratio).contains(&ratio),
            Rejection::ShapeTooDark,
        )
    }
}

impl InteriorClassifier for BoundedDarkShape {
    fn min_size(&self) -> (i32, i32) {
        (30, 30)
    }

    fn border_divisor(&self) -> i32 {
        5
    }

    /// The shape window is only sampled once the background passes.
    fn classify(&self, sampler: &RegionSampler<'_>, inner: &Rect) -> Verdict {
        match self.judge_background(&sampler.interior_grid(inner)) {
            Verdict::Accepted => self.judge_shape(&sampler.central_square(inner)),
            rejected => rejected,
        }
    }

    fn name(&self) -> &str {
        "bounded_dark_shape"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luma::LumaSampler;
    use crate::region::EDGE_THICKNESS;
    use marker_scan_common::pixel::PixelFormat;
    use marker_scan_common::scene::{MarkerSpec, Scene};

    /// `n` samples of which `dark` are 0 and the rest 255.
    fn window(n: usize, dark: usize) -> Vec<u8> {
        let mut v = vec![255u8; n];
        v[..dark].fill(0);
        v
    }

    /// Classify a 60x60 marker painted with the given interior and glyph.
    fn classify_marker(interior_level: u8, glyph_side: i32) -> Verdict {
        let rect = Rect::new(10, 10, 60, 60);
        let mut scene = Scene::new(80, 80, PixelFormat::Grayscale, 255);
        scene.marker(&MarkerSpec {
            interior_level,
            glyph: Some((glyph_side, 0)),
            ..MarkerSpec::solid(rect)
        });
        let sampler = RegionSampler::new(scene.frame(), LumaSampler::default());
        let inner = rect.inset(EDGE_THICKNESS).unwrap();
        BoundedDarkShape::default().classify(&sampler, &inner)
    }

    #[test]
    fn dim_background_rejected_before_shape() {
        for glyph_side in [0, 8, 16, 40] {
            assert_eq!(
                classify_marker(99, glyph_side),
                Verdict::Rejected(Rejection::BackgroundTooDark),
                "glyph {glyph_side}"
            );
        }
        assert_eq!(
            BoundedDarkShape::default().judge_background(&[99; 20]),
            Verdict::Rejected(Rejection::BackgroundTooDark)
        );
    }

    #[test]
    fn classify_runs_both_stages() {
        assert!(classify_marker(220, 16).is_accepted());
        assert!(classify_marker(220, 0).is_accepted());
        assert_eq!(
            classify_marker(220, 38),
            Verdict::Rejected(Rejection::ShapeTooDark)
        );
    }

    #[test]
    fn background_threshold_is_inclusive() {
        assert!(BoundedDarkShape::default()
            .judge_background(&[100; 5])
            .is_accepted());
    }

    #[test]
    fn too_much_dark_rejected() {
        assert_eq!(
            BoundedDarkShape::default().judge_shape(&window(10, 6)),
            Verdict::Rejected(Rejection::ShapeTooDark)
        );
    }

    #[test]
    fn bounded_dark_accepted() {
        let policy = BoundedDarkShape::default();
        assert!(policy.judge_shape(&window(10, 3)).is_accepted());
        assert!(policy.judge_shape(&window(10, 5)).is_accepted());
    }

    #[test]
    fn blank_window_passes_with_zero_lower_bound() {
        assert!(BoundedDarkShape::default()
            .judge_shape(&window(10, 0))
            .is_accepted());
        let strict = BoundedDarkShape {
            min_dark_ratio: 0.2,
            ..BoundedDarkShape::default()
        };
        assert!(!strict.judge_shape(&window(10, 0)).is_accepted());
    }

    #[test]
    fn dark_level_is_exclusive() {
        let policy = BoundedDarkShape::default();
        assert!(policy.judge_shape(&[50; 4]).is_accepted());
        assert_eq!(
            policy.judge_shape(&[49; 4]),
            Verdict::Rejected(Rejection::ShapeTooDark)
        );
    }

    #[test]
    fn empty_sets_rejected() {
        let policy = BoundedDarkShape::default();
        assert_eq!(
            policy.judge_background(&[]),
            Verdict::Rejected(Rejection::InteriorEmpty)
        );
        assert_eq!(
            policy.judge_shape(&[]),
            Verdict::Rejected(Rejection::ShapeWindowEmpty)
        );
    }
}

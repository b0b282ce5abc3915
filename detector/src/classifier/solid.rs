use marker_scan_common::frame::Rect;
use tracing::trace;

use super::traits::InteriorClassifier;
use super::{Rejection, Verdict};
use crate::region::{mean, RegionSampler};

/// Dark frame around a uniformly light interior.
///
/// Only a small square at the interior's center is sampled; its mean must
/// exceed `min_mean`.
#[derive(Debug, Clone, Copy)]
pub struct SolidInterior {
    pub min_mean: f64,
}

impl Default for SolidInterior {
    fn default() -> Self {
        Self { min_mean: 180.0 }
    }
}

impl SolidInterior {
    pub fn judge(&self, samples: &[u8]) -> Verdict {
        match mean(samples) {
            None => Verdict::Rejected(Rejection::InteriorEmpty),
            Some(avg) => {
                trace!(avg, min = self.min_mean, "interior mean");
                Verdict::check(avg > self.min_mean, Rejection::InteriorTooDark)
            }
        }
    }
}

impl InteriorClassifier for SolidInterior {
    fn min_size(&self) -> (i32, i32) {
        (20, 20)
    }

    fn border_divisor(&self) -> i32 {
        10
    }

    fn classify(&self, sampler: &RegionSampler<'_>, inner: &Rect) -> Verdict {
        self.judge(&sampler.center_window(inner))
    }

    fn name(&self) -> &str {
        "solid_interior"
    }
}
